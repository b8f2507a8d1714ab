//! Future aliases shared by the collaborator traits.

use std::future::Future;
use std::pin::Pin;

/// Boxed, non-`Send` future borrowing for `'a`.
///
/// The controller is single-threaded, so collaborator futures never need to cross threads and
/// may hold `Rc` state.
pub type BoxFutureLocal<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

//! Viewer state: the displayed frame, the series cursor and the annotation
//! session.

mod frame_store;
mod pending;
mod series;
mod session;

pub use frame_store::{Frame, FrameStore, ScaledImage};
pub use pending::{Ticket, TicketIssuer};
pub use series::{NavigationError, Series, SeriesRef};
pub use session::{AnnotationSession, ClickOutcome, CompleteOutcome};

//! Playback synchronization: clock, boundary guard, highlighting, and the
//! controller and session that tie them to a loaded book.

pub mod clock;
pub mod controller;
pub mod guard;
pub mod highlight;
pub mod primitive;
pub mod session;
pub mod state;

pub use clock::{ClockEvent, PlaybackClock};
pub use controller::NavigationController;
pub use guard::{BoundaryGuard, GuardVerdict, Subscription, enforce};
pub use highlight::highlight_index;
pub use primitive::{AudioPrimitive, MockAudioPrimitive, MockCall, PrimitiveEvent};
pub use session::{Command, Session, SessionEvent, SessionObserver};
pub use state::{Phase, PlaybackState};

pub mod archive;
pub mod capture;
pub mod classes;
pub mod coords;
pub mod dispatcher;
pub mod index;
pub mod keys;
pub mod layout;
pub mod messages;
pub mod orchestrator;
pub mod overlay;
pub mod preview;
pub mod session;
pub mod ticker;

pub use classes::ClassMap;
pub use coords::ScaleFactor;
pub use dispatcher::Dispatcher;
pub use layout::{DatasetLayout, LabelRecord};
pub use orchestrator::{CaptureOutcome, CaptureRequest, Orchestrator};
pub use session::{BoxSize, Session, SessionCommand, SessionState};

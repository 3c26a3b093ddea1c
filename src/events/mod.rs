//! # Events Module
//!
//! Progress reporting between the engine and whatever draws it.
//!
//! ## Design
//! The engine never renders anything. It emits events through a channel and
//! the CLI (or any other front end) subscribes.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Plan(PlanEvent::Progress(p)) = event {
//!             println!("{}/{} files", p.files_processed, p.files_found);
//!         }
//!     }
//! });
//!
//! let plan = pipeline.plan_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;

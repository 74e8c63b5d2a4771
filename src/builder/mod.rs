//! Builder API for declaring state machines.
//!
//! States are declared with [`StateMachineBuilder::in_state`], which hands
//! out a [`StateBuilder`] for entry/exit actions and a
//! [`TransitionBuilder`] for the transitions of that state.
//!
//! # Example
//!
//! ```rust
//! use passive_fsm::StateMachineBuilder;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut builder = StateMachineBuilder::new().name("door");
//! builder
//!     .in_state("closed")
//!     .on("open")
//!     .goto("opened");
//! builder
//!     .in_state("opened")
//!     .on_entry(|| Ok(()))
//!     .on("close")
//!     .goto("closed");
//!
//! let door = builder.build().unwrap();
//! door.initialize("closed").await.unwrap();
//! door.start().await.unwrap();
//! door.fire("open").await.unwrap();
//!
//! assert_eq!(door.current_state().await.unwrap(), Some("opened"));
//! # }
//! ```

pub mod error;
pub mod machine;
pub mod state;
pub mod transition;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use state::StateBuilder;
pub use transition::TransitionBuilder;

pub mod console;
pub mod interrupt;
pub mod session;
pub mod subscription;

pub use console::{console_echo, format_item_line, ItemObserver};
pub use interrupt::{interrupt_channel, InterruptHandle, InterruptSignal};
pub use session::{SessionConfig, SessionDriver, SessionPhase, SubredditWatch};
pub use subscription::{ControllerState, SubscriptionController};

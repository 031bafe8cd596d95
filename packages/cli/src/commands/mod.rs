pub mod init;
pub mod research;
pub mod review;
pub mod submit;

pub use init::{init, InitArgs};
pub use research::{research, ResearchCommand};
pub use review::{review, ReviewCommand};
pub use submit::{submit, SubmitArgs};

pub mod choices;
pub mod notice;
pub mod response;

pub use choices::{Currency, PaymentStatus, PaymentType, UnknownChoice};
pub use notice::{NoticeAction, NoticePayload};
pub use response::{NoticeResponse, ResultCode};

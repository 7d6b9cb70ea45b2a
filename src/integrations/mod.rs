pub mod images;
pub mod pdf;
pub mod sms;

pub use images::{HttpImageStore, ImageStore};
pub use pdf::{HttpPdfPublisher, PdfPublisher};
pub use sms::{sms_sender_from_config, HttpSmsSender, NullSmsSender, SmsSender};

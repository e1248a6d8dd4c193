//! Business logic services for the Blending Operations Suite

pub mod batch;
pub mod export;
pub mod notification;
pub mod template;

pub use batch::BatchService;
pub use export::ExportService;
pub use notification::{DeliveryOutcome, NotificationService};
pub use template::FormulaTemplateService;

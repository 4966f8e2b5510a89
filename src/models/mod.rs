// Models module - Database entity representations

pub mod category;
pub mod question;

pub use category::Category;
pub use question::Question;

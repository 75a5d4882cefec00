pub mod account;
pub mod action_item;
pub mod department;
pub mod tracked_case;
pub mod tracked_person;

pub use account::{Account, EncryptedPassword, RoleType};
pub use action_item::{ActionItem, Description, ItemType};
pub use department::Department;
pub use tracked_case::{CaseStatus, CaseType, Comment, Quarantine, TrackedCase};
pub use tracked_person::TrackedPerson;

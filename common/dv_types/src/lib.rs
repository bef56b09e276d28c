pub use duty::{Duty, DutyKind};
pub use partial_sig::{EncodeError, PartialSignedData, PartialSignedDataSet};

mod duty;
mod partial_sig;

use crate::VeilError;

pub type Result<E> = std::result::Result<E, VeilError>;

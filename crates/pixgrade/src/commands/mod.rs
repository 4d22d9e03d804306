mod compare;
mod init;

pub use self::compare::compare;
pub use self::init::init;

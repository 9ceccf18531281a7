pub mod library;
pub mod scample;
pub mod xsec;

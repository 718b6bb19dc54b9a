//! Tax module containing GST component handling

pub mod gst;

pub use gst::*;

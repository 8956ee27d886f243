//! The clock-buffer insertion pass itself. A single module since, unlike
//! `calyx-opt`, there is only one pass here and no generic pass-registration
//! machinery to host it (the host command framework that would dispatch
//! named passes is out of scope; callers invoke [`clock_buffer_insertion::run`]
//! directly).
pub mod clock_buffer_insertion;

#![cfg_attr(all(feature = "kernel", not(test)), no_std)]

pub mod constants;

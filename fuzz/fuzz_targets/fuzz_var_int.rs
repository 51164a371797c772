// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use weft::{Input, Output};

fuzz_target!(|data: &[u8]| {
    for optimize_positive in [true, false] {
        let mut input = Input::new(data);
        if let Ok(value) = input.read_var_int(optimize_positive) {
            let mut out = Output::new();
            out.write_var_int(value, optimize_positive);
            let mut again = Input::new(out.as_bytes());
            assert_eq!(again.read_var_int(optimize_positive).ok(), Some(value));
        }

        let mut input = Input::new(data);
        if let Ok(value) = input.read_var_long(optimize_positive) {
            let mut out = Output::new();
            out.write_var_long(value, optimize_positive);
            let mut again = Input::new(out.as_bytes());
            assert_eq!(again.read_var_long(optimize_positive).ok(), Some(value));
        }
    }
    let _ = Input::new(data).read_string();
});

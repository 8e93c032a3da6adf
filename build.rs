// SPDX-License-Identifier: Apache-2.0 OR MIT
fn main() {
    // Declare the `tarpaulin` cfg flag so coverage runs (which set it) don't
    // trip "unexpected cfg" errors in regular builds.
    println!("cargo:rustc-check-cfg=cfg(tarpaulin)");
}

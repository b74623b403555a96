// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;
use pangloss_core::{BackendRegistry, ConfigSources, Filter, Strictness};

fuzz_target!(|data: &[u8]| {
    let registry = BackendRegistry::with_defaults();
    let sources = ConfigSources {
        global_dir: None,
        working_dir: std::env::temp_dir(),
    };
    let filter = Filter::new(&registry, sources).with_strictness(Strictness::Lenient);

    for format in ["latex", "html"] {
        let mut output = Vec::new();
        let _ = filter.run(data, &mut output, format);
    }
});

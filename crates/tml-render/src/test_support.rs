// SPDX-License-Identifier: MIT
//
// Test doubles shared by the unit tests in this crate.

use std::io;

use tml_term::capability::{Capability, CapabilityProvider, CapabilityRequest, CapabilitySet};
use tml_term::output::{OutputMode, OutputSink};

/// Provider that expands every capability into a readable token, e.g.
/// `<bold>`, `<setaf:1>`, `<sgr:0,1,0,0,0,1,0,0,0>`.
pub struct RecordingProvider {
    pub capabilities: CapabilitySet,
}

impl RecordingProvider {
    /// Every capability, `sgr` included.
    pub const fn full() -> Self {
        Self {
            capabilities: CapabilitySet::all(),
        }
    }

    /// Every capability except `sgr`.
    pub const fn without_sgr() -> Self {
        Self {
            capabilities: CapabilitySet::all().difference(CapabilitySet::SGR),
        }
    }

    /// Only the listed capabilities.
    pub const fn only(capabilities: CapabilitySet) -> Self {
        Self { capabilities }
    }
}

impl CapabilityProvider for RecordingProvider {
    fn supports(&self, cap: Capability) -> bool {
        self.capabilities.has(cap)
    }

    fn expand(&self, request: &CapabilityRequest) -> Option<Vec<u8>> {
        if !self.supports(request.capability) {
            return None;
        }
        let token = if request.params.is_empty() {
            format!("<{}>", request.capability.capname())
        } else {
            let params: Vec<String> = request.params.iter().map(ToString::to_string).collect();
            format!("<{}:{}>", request.capability.capname(), params.join(","))
        };
        Some(token.into_bytes())
    }
}

/// An unbuffered sink over a `Vec`, so output is visible without flushing.
pub fn vec_sink() -> OutputSink<Vec<u8>> {
    OutputSink::new(Vec::new(), OutputMode::Raw)
}

/// Everything written to a `vec_sink` so far.
pub fn written(sink: &OutputSink<Vec<u8>>) -> String {
    String::from_utf8(sink.get_ref().clone()).unwrap()
}

/// Writer that fails every write.
pub struct BrokenPipe;

impl io::Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// SPDX-License-Identifier: MIT
//
// tml-render showcase — every tag in the vocabulary on the current terminal.
//
// Picks the built-in profile for $TERM (falling back to xterm), renders a
// sample document to stdout, and prints the run counters to stderr. Pipe it
// through `cat -v` to see the control strings.
//
// Usage:
//   cargo run -p tml-render --example showcase
//   TERM=vt100 cargo run -p tml-render --example showcase | cat -v

use std::io;

use tml_render::config::{OutputDevice, RenderOptions};
use tml_render::markup;
use tml_render::Renderer;
use tml_term::output::{OutputMode, OutputSink};
use tml_term::profile::TerminalProfile;
use tml_term::terminal;

const DOCUMENT: &str = r#"<tml>
<p><b>Attributes</b></p>
<p>Plain, <b>bold</b>, <i>italic</i>, <u>underline</u>, <blink>blink</blink>,
<reverse>reverse</reverse>, <standout>standout</standout>,
x<sub>sub</sub> and x<sup>sup</sup>.</p>
<p><b>Colors</b></p>
<p><black>black</black> <red>red</red> <green>green</green> <yellow>yellow</yellow>
<blue>blue</blue> <magenta>magenta</magenta> <cyan>cyan</cyan> <white>white</white></p>
<p><span bg="blue" fg="white" b="true">A line with a background is padded to the full width.</span></p>
<p><span fg="208">Palette index 208</span> shows only on 256-color terminals.</p>
<p><b>Nesting</b></p>
<p><red>red <u>red underlined <span fg="green">green underlined</span> red underlined</u> red</red></p>
<p><b>Wrapping</b></p>
<p>Supercalifragilisticexpialidocious-is-a-single-word-that-does-not-fit-anywhere-and-gets-split.</p>
</tml>
"#;

fn main() -> tml_render::Result<()> {
    let term = std::env::var("TERM").unwrap_or_default();
    let profile = TerminalProfile::lookup(&term)
        .or_else(|| TerminalProfile::named("xterm"))
        .ok_or_else(|| tml_render::Error::UnknownTerminal(term.clone()))?;

    let device = OutputDevice {
        is_tty: terminal::is_tty(1),
        window_width: terminal::window_width(1),
        profile_columns: profile.columns,
    };
    let options = RenderOptions::resolve(0, device, false);

    let sink = OutputSink::new(io::stdout(), OutputMode::Buffered);
    let mut renderer = Renderer::new(profile, sink, options);
    markup::parse_str(DOCUMENT, &mut renderer)?;
    let stats = renderer.finish()?;

    eprintln!(
        "{}: {} lines, {} bytes, {} styles pushed",
        profile.name, stats.lines, stats.bytes, stats.pushes
    );
    Ok(())
}

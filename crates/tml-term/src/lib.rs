// SPDX-License-Identifier: MIT
//
// tml-term — Terminal layer for tml-tty.
//
// Everything that touches a real terminal lives here: the capability model
// (named control strings a terminal may or may not support), the built-in
// terminal profiles that resolve those capabilities to escape sequences,
// the output sink that decides when bytes reach the device, and the raw
// mode guard that restores termios on every exit path.
//
// The rendering engine never writes an escape sequence itself. It asks a
// `CapabilityProvider` for one, and a missing capability simply produces
// nothing.

pub mod capability;
pub mod color;
pub mod output;
pub mod profile;
pub mod terminal;

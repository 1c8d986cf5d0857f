//! Terminal utilities
//!
//! The prompt is drawn with carriage returns and erase-to-end, which only
//! works when the terminal is in raw mode. This module owns the raw mode
//! switch and the size query the line clipping needs.

use crate::{Result, UcapError};
use nix::libc;
use std::os::unix::io::RawFd;

/// Get the terminal size for the given file descriptor
///
/// Listing and prompt lines are clipped to the reported width. Falls back
/// to 80x24 when the ioctl is unavailable (pipes, some containers).
pub fn get_terminal_size(fd: RawFd) -> (u16, u16) {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };

    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        (ws.ws_col, ws.ws_row)
    } else {
        (80, 24)
    }
}

/// Set raw mode on a terminal file descriptor
///
/// Raw mode lets the key handlers see every keypress, including escape
/// sequences and control characters. Returns the original attributes so
/// the caller can restore them on exit.
pub fn set_raw_mode(fd: RawFd) -> Result<libc::termios> {
    let mut original_termios: libc::termios = unsafe { std::mem::zeroed() };

    let rc = unsafe { libc::tcgetattr(fd, &mut original_termios) };
    if rc != 0 {
        return Err(UcapError::Terminal(
            "tcgetattr failed; is stdin a terminal?".to_string(),
        ));
    }

    let mut raw_termios = original_termios;
    unsafe {
        libc::cfmakeraw(&mut raw_termios);
    }

    let rc = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw_termios) };
    if rc != 0 {
        return Err(UcapError::Terminal("tcsetattr failed".to_string()));
    }

    Ok(original_termios)
}

/// Restore terminal attributes
///
/// Called on exit to return the terminal to cooked mode.
pub fn restore_termios(fd: RawFd, termios: &libc::termios) {
    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, termios);
    }
}

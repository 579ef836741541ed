//! Terminal attribute handling for the serial line.
//!
//! [`apply_line_settings`] is a pure transform on a [`Termios`] value;
//! [`configure_port`] wraps it in the `tcgetattr` / `tcsetattr(TCSANOW)`
//! round trip. Applying the same settings twice leaves the attributes
//! unchanged.

use std::os::fd::AsFd;

use nix::sys::termios::{
    self, BaudRate, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg,
    SpecialCharacterIndices, Termios,
};

use super::{SerialError, SerialSettings, READ_TIMEOUT_DECISECONDS};

/// Maps a numeric baud rate to its termios speed constant.
///
/// # Errors
///
/// Returns [`SerialError::UnsupportedBaudRate`] for rates without a constant.
pub fn baud_rate_constant(bps: u32) -> Result<BaudRate, SerialError> {
    Ok(match bps {
        1200 => BaudRate::B1200,
        2400 => BaudRate::B2400,
        4800 => BaudRate::B4800,
        9600 => BaudRate::B9600,
        19200 => BaudRate::B19200,
        38400 => BaudRate::B38400,
        57600 => BaudRate::B57600,
        115200 => BaudRate::B115200,
        230400 => BaudRate::B230400,
        other => return Err(SerialError::UnsupportedBaudRate(other)),
    })
}

/// Rewrites `tty` into raw 8-bit mode with the requested speed and parity.
///
/// # Errors
///
/// Returns [`SerialError::UnsupportedBaudRate`] or [`SerialError::SetSpeed`].
pub fn apply_line_settings(tty: &mut Termios, settings: &SerialSettings) -> Result<(), SerialError> {
    let speed = baud_rate_constant(settings.baud_rate)?;
    termios::cfsetospeed(tty, speed).map_err(SerialError::SetSpeed)?;
    termios::cfsetispeed(tty, speed).map_err(SerialError::SetSpeed)?;

    // 8-bit characters.
    tty.control_flags.remove(ControlFlags::CSIZE);
    tty.control_flags.insert(ControlFlags::CS8);

    // Breaks arrive as NUL bytes instead of being ignored.
    tty.input_flags.remove(InputFlags::IGNBRK);
    // No XON/XOFF.
    tty.input_flags
        .remove(InputFlags::IXON | InputFlags::IXOFF | InputFlags::IXANY);

    // No echo, no canonical input, no signal characters; no output remapping.
    tty.local_flags = LocalFlags::empty();
    tty.output_flags = OutputFlags::empty();

    // Ignore modem control lines, enable the receiver.
    tty.control_flags
        .insert(ControlFlags::CLOCAL | ControlFlags::CREAD);
    tty.control_flags
        .remove(ControlFlags::PARENB | ControlFlags::PARODD);
    tty.control_flags.insert(settings.parity.control_flags());
    // One stop bit, no RTS/CTS.
    tty.control_flags.remove(ControlFlags::CSTOPB);
    tty.control_flags.remove(ControlFlags::CRTSCTS);

    set_read_mode(tty, settings.blocking_reads);
    Ok(())
}

/// Reads the current attributes of `fd`, applies `settings`, and writes them
/// back immediately.
///
/// # Errors
///
/// Returns [`SerialError::GetAttributes`] / [`SerialError::SetAttributes`] if
/// the descriptor is not a terminal or the driver rejects the attributes.
pub fn configure_port<Fd: AsFd>(fd: Fd, settings: &SerialSettings) -> Result<(), SerialError> {
    let fd = fd.as_fd();
    let mut tty = termios::tcgetattr(fd).map_err(SerialError::GetAttributes)?;
    apply_line_settings(&mut tty, settings)?;
    termios::tcsetattr(fd, SetArg::TCSANOW, &tty).map_err(SerialError::SetAttributes)
}

/// Toggles `VMIN` between 0 (timed reads) and 1 (blocking reads).
///
/// # Errors
///
/// Returns [`SerialError::GetAttributes`] / [`SerialError::SetAttributes`].
pub fn set_blocking<Fd: AsFd>(fd: Fd, blocking: bool) -> Result<(), SerialError> {
    let fd = fd.as_fd();
    let mut tty = termios::tcgetattr(fd).map_err(SerialError::GetAttributes)?;
    set_read_mode(&mut tty, blocking);
    termios::tcsetattr(fd, SetArg::TCSANOW, &tty).map_err(SerialError::SetAttributes)
}

fn set_read_mode(tty: &mut Termios, blocking: bool) {
    tty.control_chars[SpecialCharacterIndices::VMIN as usize] = u8::from(blocking);
    tty.control_chars[SpecialCharacterIndices::VTIME as usize] = READ_TIMEOUT_DECISECONDS;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::serial::Parity;

    use nix::pty::{openpty, OpenptyResult, Winsize};

    fn pty() -> Option<OpenptyResult> {
        openpty(None::<&Winsize>, None::<&Termios>).ok()
    }

    fn vmin(tty: &Termios) -> u8 {
        tty.control_chars[SpecialCharacterIndices::VMIN as usize]
    }

    fn vtime(tty: &Termios) -> u8 {
        tty.control_chars[SpecialCharacterIndices::VTIME as usize]
    }

    #[test]
    fn test_baud_rate_constant_maps_common_rates() {
        assert_eq!(baud_rate_constant(9600).expect("9600"), BaudRate::B9600);
        assert_eq!(baud_rate_constant(115200).expect("115200"), BaudRate::B115200);
    }

    #[test]
    fn test_baud_rate_constant_rejects_odd_rates() {
        assert!(matches!(
            baud_rate_constant(9601),
            Err(SerialError::UnsupportedBaudRate(9601))
        ));
    }

    #[test]
    fn test_apply_line_settings_produces_raw_8n1() {
        // Arrange
        let Some(pty) = pty() else { return };
        let mut tty = termios::tcgetattr(&pty.slave).expect("tcgetattr");

        // Act
        apply_line_settings(&mut tty, &SerialSettings::default()).expect("apply");

        // Assert
        assert!(tty.control_flags.contains(ControlFlags::CS8));
        assert!(tty.control_flags.contains(ControlFlags::CLOCAL | ControlFlags::CREAD));
        assert!(!tty.control_flags.intersects(
            ControlFlags::PARENB | ControlFlags::PARODD | ControlFlags::CSTOPB | ControlFlags::CRTSCTS
        ));
        assert!(!tty.input_flags.intersects(
            InputFlags::IGNBRK | InputFlags::IXON | InputFlags::IXOFF | InputFlags::IXANY
        ));
        assert!(tty.local_flags.is_empty());
        assert!(tty.output_flags.is_empty());
        assert_eq!(vmin(&tty), 0);
        assert_eq!(vtime(&tty), 5);
        #[cfg(target_os = "linux")]
        {
            assert_eq!(termios::cfgetospeed(&tty), BaudRate::B9600);
            assert_eq!(termios::cfgetispeed(&tty), BaudRate::B9600);
        }
    }

    #[test]
    fn test_apply_line_settings_sets_requested_parity() {
        let Some(pty) = pty() else { return };
        let mut tty = termios::tcgetattr(&pty.slave).expect("tcgetattr");
        let settings = SerialSettings {
            parity: Parity::Odd,
            ..SerialSettings::default()
        };

        apply_line_settings(&mut tty, &settings).expect("apply");

        assert!(tty
            .control_flags
            .contains(ControlFlags::PARENB | ControlFlags::PARODD));
    }

    #[test]
    fn test_apply_line_settings_blocking_sets_vmin_one() {
        let Some(pty) = pty() else { return };
        let mut tty = termios::tcgetattr(&pty.slave).expect("tcgetattr");
        let settings = SerialSettings {
            blocking_reads: true,
            ..SerialSettings::default()
        };

        apply_line_settings(&mut tty, &settings).expect("apply");

        assert_eq!(vmin(&tty), 1);
        assert_eq!(vtime(&tty), 5);
    }

    #[test]
    fn test_configure_port_is_idempotent() {
        // Arrange
        let Some(pty) = pty() else { return };
        let settings = SerialSettings::default();

        // Act
        configure_port(&pty.slave, &settings).expect("first configure");
        let first = termios::tcgetattr(&pty.slave).expect("tcgetattr");
        configure_port(&pty.slave, &settings).expect("second configure");
        let second = termios::tcgetattr(&pty.slave).expect("tcgetattr");

        // Assert
        assert_eq!(first.control_flags, second.control_flags);
        assert_eq!(first.input_flags, second.input_flags);
        assert_eq!(first.output_flags, second.output_flags);
        assert_eq!(first.local_flags, second.local_flags);
        assert_eq!(first.control_chars, second.control_chars);
    }

    #[test]
    fn test_set_blocking_toggles_vmin_and_keeps_timeout() {
        let Some(pty) = pty() else { return };
        configure_port(&pty.slave, &SerialSettings::default()).expect("configure");

        set_blocking(&pty.slave, true).expect("block");
        let blocking = termios::tcgetattr(&pty.slave).expect("tcgetattr");
        set_blocking(&pty.slave, false).expect("unblock");
        let timed = termios::tcgetattr(&pty.slave).expect("tcgetattr");

        assert_eq!((vmin(&blocking), vtime(&blocking)), (1, 5));
        assert_eq!((vmin(&timed), vtime(&timed)), (0, 5));
    }

    #[test]
    fn test_configure_port_rejects_non_terminal() {
        // A regular file has no terminal attributes.
        let path = std::env::temp_dir().join(format!("cursorlink-not-a-tty-{}", std::process::id()));
        let file = std::fs::File::create(&path).expect("create temp file");

        let result = configure_port(&file, &SerialSettings::default());

        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(SerialError::GetAttributes(_))));
    }
}

//! State of one erase (and write) operation

use easyinstall_core::board::BoardProfile;
use easyinstall_core::params::{EraseParams, WriteParams};
use easyinstall_serial::DeviceHandle;

/// One flash operation against one device
#[derive(Debug, Clone)]
pub struct FlashSession {
    device: DeviceHandle,
    profile: Option<BoardProfile>,
    erase: EraseParams,
    write: Option<WriteParams>,
    attempts: u32,
}

impl FlashSession {
    /// Erase the whole flash of `device`, nothing else
    pub fn erase_only(device: DeviceHandle) -> Self {
        Self {
            erase: EraseParams::new(device.port.clone()),
            device,
            profile: None,
            write: None,
            attempts: 0,
        }
    }

    /// Erase `device`, then write `profile`
    pub fn for_profile(profile: BoardProfile, device: DeviceHandle) -> Self {
        Self {
            erase: EraseParams::new(device.port.clone()),
            write: Some(WriteParams::for_profile(device.port.clone(), &profile)),
            profile: Some(profile),
            device,
            attempts: 0,
        }
    }

    /// Target device
    pub fn device(&self) -> &DeviceHandle {
        &self.device
    }

    /// Board profile, if this session writes one
    pub fn profile(&self) -> Option<&BoardProfile> {
        self.profile.as_ref()
    }

    /// Erase parameters
    pub fn erase_params(&self) -> &EraseParams {
        &self.erase
    }

    /// Write parameters, if this session writes
    pub fn write_params(&self) -> Option<&WriteParams> {
        self.write.as_ref()
    }

    /// Name used in messages: the board, or the port for an erase-only session
    pub fn target(&self) -> String {
        match &self.profile {
            Some(profile) => profile.board.to_string(),
            None => self.device.port.clone(),
        }
    }

    /// Count flasher invocations made for this session
    pub fn add_attempts(&mut self, attempts: u32) {
        self.attempts += attempts;
    }

    /// Flasher invocations so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

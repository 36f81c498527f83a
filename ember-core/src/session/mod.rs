//! Session state
//!
//! One owned [`SessionState`] replaces the flag soup a print job needs. Only
//! the [`Engraver`](crate::Engraver) mutates it, through the transitions
//! below; every transition is a plain method so it can be tested without
//! hardware.

mod dispatch;

use ember_protocol::BurnCommand;

use crate::safety::HaltReason;

/// Link initialization handshake progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitState {
    /// Power-on sequence has not run yet
    NotInitialized,
    /// Hardware reset done, the initialized broadcast is still owed
    JustInitialized,
    /// Host acknowledged the initialized broadcast
    Initialized,
}

/// Everything the dispatcher knows about the current print job
#[derive(Debug, Clone)]
pub struct SessionState {
    init: InitState,
    picture_in_progress: bool,
    burn_ready: bool,
    first_pixel_pending: bool,
    door_cycled: bool,
    last_rx_ms: Option<u32>,
    pixel_requested_ms: Option<u32>,
    pending_burn: Option<BurnCommand>,
    last_halt: Option<HaltReason>,
    halt_count: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub const fn new() -> Self {
        Self {
            init: InitState::NotInitialized,
            picture_in_progress: false,
            burn_ready: false,
            first_pixel_pending: false,
            door_cycled: false,
            last_rx_ms: None,
            pixel_requested_ms: None,
            pending_burn: None,
            last_halt: None,
            halt_count: 0,
        }
    }

    pub fn init(&self) -> InitState {
        self.init
    }

    pub fn picture_in_progress(&self) -> bool {
        self.picture_in_progress
    }

    /// A Burn was accepted and not yet executed
    pub fn burn_ready(&self) -> bool {
        self.burn_ready
    }

    /// The next accepted Burn is the first of the picture
    pub fn first_pixel_pending(&self) -> bool {
        self.first_pixel_pending
    }

    /// The lid has been opened and closed since the last picture ended
    pub fn door_cycled(&self) -> bool {
        self.door_cycled
    }

    /// When the last frame arrived, if ever
    pub fn last_rx_ms(&self) -> Option<u32> {
        self.last_rx_ms
    }

    /// When the outstanding pixel request was acknowledged
    pub fn pixel_requested_ms(&self) -> Option<u32> {
        self.pixel_requested_ms
    }

    pub fn pending_burn(&self) -> Option<BurnCommand> {
        self.pending_burn
    }

    pub fn last_halt(&self) -> Option<HaltReason> {
        self.last_halt
    }

    /// Number of halts that found something to stop
    pub fn halt_count(&self) -> u32 {
        self.halt_count
    }

    pub(crate) fn record_rx(&mut self, now_ms: u32) {
        self.last_rx_ms = Some(now_ms);
    }

    /// Hardware was reset; the initialized broadcast is owed
    ///
    /// Also ends any picture in progress and drops a pending burn.
    pub(crate) fn reset_link(&mut self) {
        self.init = InitState::JustInitialized;
        self.picture_in_progress = false;
        self.burn_ready = false;
        self.first_pixel_pending = false;
        self.pixel_requested_ms = None;
        self.pending_burn = None;
    }

    pub(crate) fn announced(&mut self) {
        self.init = InitState::Initialized;
    }

    pub(crate) fn door_cycle_observed(&mut self) {
        self.door_cycled = true;
    }

    pub(crate) fn begin_picture(&mut self) {
        self.picture_in_progress = true;
        self.burn_ready = false;
        self.first_pixel_pending = true;
        self.pixel_requested_ms = None;
        self.pending_burn = None;
    }

    pub(crate) fn first_pixel_armed(&mut self) {
        self.first_pixel_pending = false;
    }

    pub(crate) fn accept_burn(&mut self, burn: BurnCommand) {
        self.burn_ready = true;
        self.pending_burn = Some(burn);
        self.pixel_requested_ms = None;
    }

    /// Take the accepted Burn for execution, clearing `burn_ready`
    pub(crate) fn take_burn(&mut self) -> Option<BurnCommand> {
        if !self.burn_ready {
            return None;
        }
        self.burn_ready = false;
        self.pending_burn.take()
    }

    pub(crate) fn pixel_requested(&mut self, now_ms: u32) {
        self.pixel_requested_ms = Some(now_ms);
    }

    pub(crate) fn end_picture(&mut self) {
        self.picture_in_progress = false;
        self.burn_ready = false;
        self.first_pixel_pending = false;
        self.door_cycled = false;
        self.pixel_requested_ms = None;
        self.pending_burn = None;
    }

    /// Record a halt
    ///
    /// Returns false if the session was already stopped.
    pub(crate) fn halted(&mut self, reason: HaltReason) -> bool {
        let active = self.picture_in_progress || self.burn_ready || self.pixel_requested_ms.is_some();
        self.picture_in_progress = false;
        self.burn_ready = false;
        self.pixel_requested_ms = None;
        self.pending_burn = None;
        if active {
            self.last_halt = Some(reason);
            self.halt_count = self.halt_count.wrapping_add(1);
        }
        active
    }

    /// Returns true once the outstanding pixel request is older than `timeout_ms`
    pub fn pixel_timed_out(&self, now_ms: u32, timeout_ms: u32) -> bool {
        match self.pixel_requested_ms {
            Some(at) => now_ms.wrapping_sub(at) > timeout_ms,
            None => false,
        }
    }
}

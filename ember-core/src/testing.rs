//! Test doubles
//!
//! All mocks share one [`Sim`]: a simulated millisecond clock, an ordered
//! event log, scripted lid readings and a scripted host on the far end of
//! the link.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use ember_protocol::{AckKind, Codec, CommandId, Packet};

use crate::config::EngraverConfig;
use crate::engraver::{Engraver, Head};
use crate::traits::{Clock, Fan, LaserDriver, LidSensor, LinkError, Motion, MotionFault, PacketLink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    LaserEnable,
    LaserDisable,
    LaserOn(u16),
    LaserOff,
    Fan(bool),
    MoveTo(u16, u16),
    Home,
    Lid(bool),
    /// Frame sent by the device, as the host decoded it
    Sent(Packet),
}

pub struct Sim {
    now: Cell<u32>,
    events: RefCell<Vec<Event>>,
    lid_script: RefCell<VecDeque<bool>>,
    lid_default: Cell<bool>,
    move_fault: Cell<Option<MotionFault>>,
    home_fault: Cell<Option<MotionFault>>,
    /// Frames from the host with the time they become readable
    inbound: RefCell<VecDeque<(u32, Vec<u8>)>>,
    /// Commands the host acknowledges, with Acks still to swallow
    auto_ack: RefCell<Vec<(CommandId, u32)>>,
}

impl Sim {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(0),
            events: RefCell::new(Vec::new()),
            lid_script: RefCell::new(VecDeque::new()),
            lid_default: Cell::new(true),
            move_fault: Cell::new(None),
            home_fault: Cell::new(None),
            inbound: RefCell::new(VecDeque::new()),
            auto_ack: RefCell::new(Vec::new()),
        })
    }

    pub fn now(&self) -> u32 {
        self.now.get()
    }

    pub fn set_now(&self, ms: u32) {
        self.now.set(ms);
    }

    fn log(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    /// Packets the device sent, in order
    pub fn sent(&self) -> Vec<Packet> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Sent(packet) => Some(packet.clone()),
                _ => None,
            })
            .collect()
    }

    /// Lid readings to return before falling back to closed
    pub fn script_lid(&self, readings: &[bool]) {
        self.lid_script.borrow_mut().extend(readings.iter().copied());
    }

    pub fn fail_moves(&self, fault: MotionFault) {
        self.move_fault.set(Some(fault));
    }

    pub fn fail_homing(&self, fault: MotionFault) {
        self.home_fault.set(Some(fault));
    }

    /// Host sends `packet` now
    pub fn host_sends(&self, packet: Packet) {
        self.host_sends_at(self.now(), packet);
    }

    /// Host sends `packet` once the clock reaches `at_ms`
    pub fn host_sends_at(&self, at_ms: u32, packet: Packet) {
        self.inbound.borrow_mut().push_back((at_ms, host_frame(&packet)));
    }

    pub fn host_sends_raw(&self, frame: Vec<u8>) {
        self.inbound.borrow_mut().push_back((self.now(), frame));
    }

    /// Host acknowledges every `command`, after ignoring the first `drops`
    pub fn auto_ack(&self, command: CommandId, drops: u32) {
        self.auto_ack.borrow_mut().push((command, drops));
    }

    fn host_receives(&self, packet: Packet) {
        if packet.ack == AckKind::NewCommand {
            if let Some(command) = packet.command {
                let mut rules = self.auto_ack.borrow_mut();
                if let Some(rule) = rules.iter_mut().find(|(c, _)| *c == command) {
                    if rule.1 > 0 {
                        rule.1 -= 1;
                    } else {
                        self.inbound
                            .borrow_mut()
                            .push_back((self.now(), host_frame(&Packet::ack(command))));
                    }
                }
            }
        }
        self.log(Event::Sent(packet));
    }
}

/// Encode as the host would
pub fn host_frame(packet: &Packet) -> Vec<u8> {
    Codec::host().encode_to_vec(packet).unwrap().to_vec()
}

pub struct MockLink {
    sim: Rc<Sim>,
}

impl PacketLink for MockLink {
    fn frame_ready(&self) -> bool {
        self.sim
            .inbound
            .borrow()
            .front()
            .is_some_and(|(at, _)| *at <= self.sim.now())
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> usize {
        let Some((_, frame)) = self.sim.inbound.borrow_mut().pop_front() else {
            return 0;
        };
        let len = frame.len().min(buf.len());
        buf[..len].copy_from_slice(&frame[..len]);
        len
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        let packet = Codec::host().decode(frame).unwrap();
        self.sim.host_receives(packet);
        Ok(())
    }
}

pub struct MockLaser {
    sim: Rc<Sim>,
    enabled: bool,
}

impl LaserDriver for MockLaser {
    fn enable(&mut self) {
        self.enabled = true;
        self.sim.log(Event::LaserEnable);
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.sim.log(Event::LaserDisable);
    }

    fn turn_on(&mut self, duty_permille: u16) {
        self.sim.log(Event::LaserOn(duty_permille));
    }

    fn turn_off(&mut self) {
        self.sim.log(Event::LaserOff);
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

pub struct MockFan {
    sim: Rc<Sim>,
    on: bool,
}

impl Fan for MockFan {
    fn set_on(&mut self, on: bool) {
        self.on = on;
        self.sim.log(Event::Fan(on));
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

pub struct MockMotion {
    sim: Rc<Sim>,
}

impl Motion for MockMotion {
    async fn move_to(&mut self, x: u16, y: u16) -> Result<(), MotionFault> {
        self.sim.log(Event::MoveTo(x, y));
        match self.sim.move_fault.get() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    async fn home(&mut self) -> Result<(), MotionFault> {
        self.sim.log(Event::Home);
        match self.sim.home_fault.get() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

pub struct MockLid {
    sim: Rc<Sim>,
}

impl LidSensor for MockLid {
    fn is_closed(&mut self) -> bool {
        let closed = self
            .sim
            .lid_script
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.sim.lid_default.get());
        self.sim.log(Event::Lid(closed));
        closed
    }
}

pub struct MockClock {
    sim: Rc<Sim>,
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.sim.now()
    }

    async fn sleep_ms(&self, ms: u32) {
        self.sim.set_now(self.sim.now().wrapping_add(ms));
    }
}

pub type TestEngraver = Engraver<MockLink, MockLaser, MockFan, MockMotion, MockLid, MockClock>;

pub fn rig(sim: &Rc<Sim>) -> TestEngraver {
    rig_with(sim, EngraverConfig::default())
}

pub fn rig_with(sim: &Rc<Sim>, config: EngraverConfig) -> TestEngraver {
    let head = Head {
        laser: MockLaser {
            sim: sim.clone(),
            enabled: false,
        },
        fan: MockFan {
            sim: sim.clone(),
            on: false,
        },
        motion: MockMotion { sim: sim.clone() },
        lid: MockLid { sim: sim.clone() },
    };
    Engraver::new(
        MockLink { sim: sim.clone() },
        head,
        MockClock { sim: sim.clone() },
        config,
    )
}

/// Run a Start exchange with the lid opened then closed
pub fn start_picture(sim: &Rc<Sim>, engraver: &mut TestEngraver) {
    sim.script_lid(&[false, true]);
    sim.host_sends(Packet::empty(CommandId::Start));
    embassy_futures::block_on(engraver.service_link());
    assert!(engraver.state().picture_in_progress());
}

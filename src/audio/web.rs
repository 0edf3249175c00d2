//! Web Audio sink
//!
//! Procedurally generated sound - no external files needed!

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use web_sys::{
    AudioBufferSourceNode, AudioContext, AudioContextState, BiquadFilterNode, BiquadFilterType,
    GainNode, OscillatorNode, OscillatorType,
};

use super::{AudioSink, DroneParam, OneShot};
use crate::error::AudioError;

/// Seconds of looping white noise
const NOISE_SECONDS: f32 = 2.0;
/// Fade applied when the drone stops
const STOP_FADE: f64 = 0.05;

/// The continuous voice graph:
/// tone -> tone_gain -> master, noise -> filter -> noise_gain -> master
struct Drone {
    tone: OscillatorNode,
    noise: AudioBufferSourceNode,
    filter: BiquadFilterNode,
    master: GainNode,
}

pub struct WebAudioSink {
    ctx: AudioContext,
    drone: Option<Drone>,
}

fn node_err(e: wasm_bindgen::JsValue) -> AudioError {
    AudioError::Node(format!("{:?}", e))
}

impl WebAudioSink {
    pub fn new() -> Result<Self, AudioError> {
        let ctx = AudioContext::new().map_err(|e| AudioError::Create(format!("{:?}", e)))?;
        Ok(Self { ctx, drone: None })
    }

    fn build_drone(&self) -> Result<Drone, AudioError> {
        let ctx = &self.ctx;
        let master = ctx.create_gain().map_err(node_err)?;
        master.gain().set_value(0.0);
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(node_err)?;

        let tone = ctx.create_oscillator().map_err(node_err)?;
        tone.set_type(OscillatorType::Sawtooth);
        tone.frequency().set_value(super::BASE_FREQUENCY);
        let tone_gain = ctx.create_gain().map_err(node_err)?;
        tone_gain.gain().set_value(0.6);
        tone.connect_with_audio_node(&tone_gain).map_err(node_err)?;
        tone_gain.connect_with_audio_node(&master).map_err(node_err)?;

        let rate = ctx.sample_rate();
        let frames = (rate * NOISE_SECONDS) as u32;
        let buffer = ctx.create_buffer(1, frames, rate).map_err(node_err)?;
        let mut rng = Pcg32::seed_from_u64(js_sys::Date::now() as u64);
        let mut samples: Vec<f32> = (0..frames).map(|_| rng.random_range(-1.0..1.0)).collect();
        buffer
            .copy_to_channel(&mut samples, 0)
            .map_err(node_err)?;

        let noise = ctx.create_buffer_source().map_err(node_err)?;
        noise.set_buffer(Some(&buffer));
        noise.set_loop(true);

        let filter = ctx.create_biquad_filter().map_err(node_err)?;
        filter.set_type(BiquadFilterType::Lowpass);
        filter.frequency().set_value(super::BASE_CUTOFF);
        filter.q().set_value(1.0);
        let noise_gain = ctx.create_gain().map_err(node_err)?;
        noise_gain.gain().set_value(0.35);
        noise.connect_with_audio_node(&filter).map_err(node_err)?;
        filter.connect_with_audio_node(&noise_gain).map_err(node_err)?;
        noise_gain.connect_with_audio_node(&master).map_err(node_err)?;

        tone.start().map_err(node_err)?;
        noise.start().map_err(node_err)?;

        Ok(Drone {
            tone,
            noise,
            filter,
            master,
        })
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = self.ctx.create_oscillator().ok()?;
        let gain = self.ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Notes played in sequence, each with a short decay
    fn arpeggio(
        &self,
        notes: &[f32],
        spacing: f64,
        length: f64,
        osc_type: OscillatorType,
        vol: f32,
    ) {
        for (i, freq) in notes.iter().enumerate() {
            let delay = i as f64 * spacing;
            if let Some((osc, gain)) = self.create_osc(*freq, osc_type) {
                let t = self.ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + length)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + length + 0.05).ok();
            }
        }
    }

    /// Two stacked buzzes - the arena's interaction click
    fn play_click(&self, vol: f32) {
        let t = self.ctx.current_time();
        for (freq, osc_type, length) in [
            (150.0, OscillatorType::Square, 0.1),
            (100.0, OscillatorType::Sawtooth, 0.15),
        ] {
            if let Some((osc, gain)) = self.create_osc(freq, osc_type) {
                gain.gain().set_value_at_time(vol * 0.1, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + length)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + length).ok();
            }
        }
    }

    /// Rising sweep
    fn play_pulse(&self, vol: f32) {
        let Some((osc, gain)) = self.create_osc(220.0, OscillatorType::Sine) else {
            return;
        };
        let t = self.ctx.current_time();

        gain.gain().set_value_at_time(0.01, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.3, t + 0.05)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(880.0, t + 0.4)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.55).ok();
    }

    /// Whoosh up with a sub thump
    fn play_boost(&self, vol: f32) {
        let t = self.ctx.current_time();
        if let Some((osc, gain)) = self.create_osc(200.0, OscillatorType::Triangle) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.frequency().set_value_at_time(200.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(600.0, t + 0.15)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }
        if let Some((osc, gain)) = self.create_osc(50.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }
    }
}

impl AudioSink for WebAudioSink {
    fn resume(&mut self) {
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }

    fn start_drone(&mut self) -> Result<(), AudioError> {
        if self.drone.is_none() {
            self.drone = Some(self.build_drone()?);
        }
        Ok(())
    }

    fn drone_active(&self) -> bool {
        self.drone.is_some()
    }

    fn glide(&mut self, param: DroneParam, target: f32, time_constant: f32) {
        let Some(drone) = &self.drone else { return };
        let audio_param = match param {
            DroneParam::ToneFrequency => drone.tone.frequency(),
            DroneParam::NoiseCutoff => drone.filter.frequency(),
            DroneParam::MasterGain => drone.master.gain(),
        };
        audio_param
            .set_target_at_time(target, self.ctx.current_time(), time_constant as f64)
            .ok();
    }

    fn stop_drone(&mut self) {
        let Some(drone) = self.drone.take() else {
            return;
        };
        let t = self.ctx.current_time();
        let gain = drone.master.gain();
        gain.cancel_scheduled_values(t).ok();
        gain.set_target_at_time(0.0, t, STOP_FADE / 3.0).ok();
        drone.tone.stop_with_when(t + STOP_FADE * 2.0).ok();
        drone.noise.stop_with_when(t + STOP_FADE * 2.0).ok();
    }

    fn play(&mut self, shot: OneShot, vol: f32) {
        if vol <= 0.0 {
            return;
        }
        self.resume();
        match shot {
            OneShot::Pickup => {
                self.arpeggio(&[600.0, 800.0, 1000.0], 0.08, 0.15, OscillatorType::Sine, vol * 0.25)
            }
            OneShot::PulseBroadcast => self.play_pulse(vol),
            OneShot::Click => self.play_click(vol),
            OneShot::Boost => self.play_boost(vol),
            OneShot::GameOver => self.arpeggio(
                &[400.0, 350.0, 300.0, 200.0],
                0.2,
                0.3,
                OscillatorType::Sine,
                vol * 0.3,
            ),
            OneShot::NewRecord => self.arpeggio(
                &[500.0, 600.0, 700.0, 800.0, 1000.0],
                0.08,
                0.25,
                OscillatorType::Triangle,
                vol * 0.25,
            ),
        }
    }

    fn close(&mut self) {
        self.stop_drone();
        let _ = self.ctx.close();
    }
}

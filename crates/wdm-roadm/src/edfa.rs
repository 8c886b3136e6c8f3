//! Amplifier (EDFA) control.
//!
//! The card only accepts mode and target changes on an amplifier that is out
//! of service, so every reconfiguration is sent as two edits: one taking the
//! amplifier out of service, then, after the settle delay, one carrying the
//! new values together with the requested maintenance state.
//!
//! Writes are never retried. Target read-backs go through
//! [`retry_bounded`] and return the last error once the budget is spent.

use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use wdm_common::{retry_bounded, Datastore, NetconfTransport, RetryPolicy, WdmError, WdmResult};
use wdm_types::{AmplifierRole, ServiceState};

use crate::commands;
use crate::reconciler::expect_ok;
use crate::tables::{fields, tables};

/// How the amplifier regulates its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlMode {
    #[default]
    ConstantPower,
    ConstantGain,
}

impl ControlMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ControlMode::ConstantPower => "constant-power",
            ControlMode::ConstantGain => "constant-gain",
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ControlMode {
    type Err = WdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant-power" => Ok(ControlMode::ConstantPower),
            "constant-gain" => Ok(ControlMode::ConstantGain),
            _ => Err(WdmError::validation(
                "control_mode",
                format!("'{}' (expected constant-power or constant-gain)", s),
            )),
        }
    }
}

/// Gain stage selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GainSwitchMode {
    #[default]
    LowGain,
    HighGain,
}

impl GainSwitchMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GainSwitchMode::LowGain => "low-gain",
            GainSwitchMode::HighGain => "high-gain",
        }
    }
}

impl fmt::Display for GainSwitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GainSwitchMode {
    type Err = WdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low-gain" => Ok(GainSwitchMode::LowGain),
            "high-gain" => Ok(GainSwitchMode::HighGain),
            _ => Err(WdmError::validation(
                "gain_switch_mode",
                format!("'{}' (expected low-gain or high-gain)", s),
            )),
        }
    }
}

/// Full amplifier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdfaSettings {
    pub maintenance_state: ServiceState,
    pub control_mode: ControlMode,
    pub gain_switch_mode: GainSwitchMode,
    /// dB, used in constant-gain mode.
    pub target_gain: f64,
    /// dBm, used in constant-power mode.
    pub target_power: f64,
    pub target_gain_tilt: f64,
    pub los_shutdown: bool,
    /// dBm
    pub optical_loo_threshold: f64,
}

impl Default for EdfaSettings {
    fn default() -> Self {
        Self {
            maintenance_state: ServiceState::InService,
            control_mode: ControlMode::ConstantPower,
            gain_switch_mode: GainSwitchMode::LowGain,
            target_gain: 0.0,
            target_power: -10.0,
            target_gain_tilt: 0.0,
            los_shutdown: true,
            optical_loo_threshold: -50.0,
        }
    }
}

impl EdfaSettings {
    fn validate(&self) -> WdmResult<()> {
        let values = [
            ("target_gain", self.target_gain),
            ("target_power", self.target_power),
            ("target_gain_tilt", self.target_gain_tilt),
            ("optical_loo_threshold", self.optical_loo_threshold),
        ];
        for (field, value) in values {
            if !value.is_finite() {
                return Err(WdmError::validation(field, format!("{} is not a number", value)));
            }
        }
        Ok(())
    }

    /// Leaves of the final edit, in the order the card expects them.
    fn leaves(&self) -> Vec<(&'static str, String)> {
        let mut leaves = vec![
            (fields::MAINTENANCE_STATE, self.maintenance_state.to_string()),
            (fields::CONTROL_MODE, self.control_mode.to_string()),
        ];
        match self.control_mode {
            ControlMode::ConstantPower => {
                leaves.push((fields::GAIN_SWITCH_MODE, self.gain_switch_mode.to_string()));
                leaves.push((fields::TARGET_POWER, self.target_power.to_string()));
            }
            ControlMode::ConstantGain => {
                leaves.push((fields::TARGET_GAIN, self.target_gain.to_string()));
            }
        }
        leaves.push((fields::TARGET_GAIN_TILT, self.target_gain_tilt.to_string()));
        leaves.push((fields::LOS_SHUTDOWN, self.los_shutdown.to_string()));
        leaves.push((
            fields::OPTICAL_LOO_THRESHOLD,
            self.optical_loo_threshold.to_string(),
        ));
        leaves
    }
}

mod stages {
    pub const OUT_OF_SERVICE: &str = "edfa-out-of-service";
    pub const IN_SERVICE: &str = "edfa-in-service";
    pub const CONFIGURE: &str = "edfa-configure";
    pub const DISABLE_ALS: &str = "disable-als";
}

/// Writes amplifier settings over a borrowed session.
pub struct EdfaController<'a, T: ?Sized> {
    session: &'a mut T,
    settle_delay: Duration,
    retry: RetryPolicy,
}

impl<'a, T: NetconfTransport + ?Sized> EdfaController<'a, T> {
    pub fn new(session: &'a mut T, settle_delay: Duration, retry: RetryPolicy) -> Self {
        Self {
            session,
            settle_delay,
            retry,
        }
    }

    /// Applies `settings` to one amplifier.
    #[instrument(skip(self, settings), fields(role = %role, mode = %settings.control_mode))]
    pub fn configure(&mut self, role: AmplifierRole, settings: &EdfaSettings) -> WdmResult<()> {
        settings.validate()?;
        self.reconfigure(role, stages::CONFIGURE, settings.leaves())?;
        info!(
            "Configured {} ({}) in {} mode",
            role, settings.maintenance_state, settings.control_mode
        );
        Ok(())
    }

    pub fn set_offline(&mut self, role: AmplifierRole) -> WdmResult<()> {
        self.set_maintenance_state(role, ServiceState::OutOfService, stages::OUT_OF_SERVICE)
    }

    pub fn set_online(&mut self, role: AmplifierRole) -> WdmResult<()> {
        self.set_maintenance_state(role, ServiceState::InService, stages::IN_SERVICE)
    }

    /// Switches to constant-power mode with the given output target (dBm).
    #[instrument(skip(self), fields(role = %role))]
    pub fn set_constant_power(
        &mut self,
        role: AmplifierRole,
        target_power: f64,
        target_gain_tilt: f64,
    ) -> WdmResult<()> {
        finite("target_power", target_power)?;
        finite("target_gain_tilt", target_gain_tilt)?;
        self.reconfigure(
            role,
            stages::CONFIGURE,
            vec![
                (fields::MAINTENANCE_STATE, ServiceState::InService.to_string()),
                (fields::TARGET_POWER, target_power.to_string()),
                (fields::TARGET_GAIN_TILT, target_gain_tilt.to_string()),
                (fields::CONTROL_MODE, ControlMode::ConstantPower.to_string()),
            ],
        )
    }

    /// Switches to constant-gain mode with the given gain target (dB).
    #[instrument(skip(self), fields(role = %role))]
    pub fn set_constant_gain(
        &mut self,
        role: AmplifierRole,
        target_gain: f64,
        target_gain_tilt: f64,
    ) -> WdmResult<()> {
        finite("target_gain", target_gain)?;
        finite("target_gain_tilt", target_gain_tilt)?;
        self.reconfigure(
            role,
            stages::CONFIGURE,
            vec![
                (fields::MAINTENANCE_STATE, ServiceState::InService.to_string()),
                (fields::TARGET_GAIN, target_gain.to_string()),
                (fields::TARGET_GAIN_TILT, target_gain_tilt.to_string()),
                (fields::CONTROL_MODE, ControlMode::ConstantGain.to_string()),
            ],
        )
    }

    /// Selects the gain stage. The card only offers this in constant-power
    /// mode, so the mode is set along with it.
    #[instrument(skip(self), fields(role = %role, mode = %mode))]
    pub fn set_gain_switch_mode(&mut self, role: AmplifierRole, mode: GainSwitchMode) -> WdmResult<()> {
        self.reconfigure(
            role,
            stages::CONFIGURE,
            vec![
                (fields::MAINTENANCE_STATE, ServiceState::InService.to_string()),
                (fields::CONTROL_MODE, ControlMode::ConstantPower.to_string()),
                (fields::GAIN_SWITCH_MODE, mode.to_string()),
            ],
        )
    }

    #[instrument(skip(self), fields(role = %role))]
    pub fn set_los_shutdown(&mut self, role: AmplifierRole, enabled: bool) -> WdmResult<()> {
        self.reconfigure(
            role,
            stages::CONFIGURE,
            vec![
                (fields::MAINTENANCE_STATE, ServiceState::InService.to_string()),
                (fields::LOS_SHUTDOWN, enabled.to_string()),
            ],
        )
    }

    /// Suspends automatic laser shutdown on the booster for `timeout_secs`.
    #[instrument(skip(self))]
    pub fn disable_als(&mut self, timeout_secs: u32) -> WdmResult<()> {
        let role = AmplifierRole::Booster;
        let reply = self
            .session
            .dispatch(&commands::disable_als_rpc(role, timeout_secs));
        expect_ok(role.as_str(), stages::DISABLE_ALS, 1, reply)?;
        info!("ALS disabled on {} for {} s", role, timeout_secs);
        Ok(())
    }

    /// Configured gain target (dB), read from the running datastore.
    pub fn target_gain(&mut self, role: AmplifierRole) -> WdmResult<f64> {
        self.read_target(role, fields::TARGET_GAIN)
    }

    /// Configured power target (dBm), read from the running datastore.
    pub fn target_power(&mut self, role: AmplifierRole) -> WdmResult<f64> {
        self.read_target(role, fields::TARGET_POWER)
    }

    fn set_maintenance_state(
        &mut self,
        role: AmplifierRole,
        state: ServiceState,
        stage: &str,
    ) -> WdmResult<()> {
        let doc = commands::edfa_edit_config(role, &[(fields::MAINTENANCE_STATE, state.to_string())]);
        let reply = self.session.edit_config(Datastore::Running, &doc);
        expect_ok(role.as_str(), stage, 1, reply)?;
        debug!("{} set {}", role, state);
        Ok(())
    }

    /// Out of service, settle, then the final edit.
    fn reconfigure(
        &mut self,
        role: AmplifierRole,
        stage: &str,
        leaves: Vec<(&'static str, String)>,
    ) -> WdmResult<()> {
        self.set_offline(role)?;
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }
        let reply = self
            .session
            .edit_config(Datastore::Running, &commands::edfa_edit_config(role, &leaves));
        expect_ok(role.as_str(), stage, 1, reply)
    }

    fn read_target(&mut self, role: AmplifierRole, field: &str) -> WdmResult<f64> {
        let filter = commands::edfa_config_filter(role, field);
        let session = &mut *self.session;
        retry_bounded(field, self.retry, |_| {
            let reply = session.get_config(Datastore::Running, &filter)?;
            let data = reply.data()?;
            data.parse_at::<f64>(&[tables::EDFAS, tables::EDFA, fields::CONFIG, field])
                .map_err(|e| e.with_raw(reply.raw()))
        })
    }
}

fn finite(field: &str, value: f64) -> WdmResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(WdmError::validation(field, format!("{} is not a number", value)))
    }
}

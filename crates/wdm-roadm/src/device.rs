//! The ROADM device object.
//!
//! A [`Roadm`] owns one NETCONF session and the [`WssState`] mirror built
//! from it. It is only constructed after the access guard has approved the
//! device's fiber patch. Plan operations generate every plan they need
//! before the first write, then push each through the
//! [`ConnectionReconciler`]. Any write drops the cached connection table;
//! telemetry accessors re-read their own section on every call.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{info, instrument, warn};

use wdm_common::{
    retry_bounded, AccessGuard, NetconfTransport, RetryPolicy, TestbedConfig, WdmError, WdmResult,
};
use wdm_types::WssModule;

use crate::connection::{resolve_module, ConnectionSpec};
use crate::edfa::EdfaController;
use crate::plan::{FlexGridPlan, GridEntry, GridOptions, GridTarget, PlanGenerator};
use crate::reconciler::ConnectionReconciler;
use crate::state::{EdfaPair, PortReading, WssState};

/// A WSS line card with its booster and preamp.
pub struct Roadm<T> {
    name: String,
    session: T,
    state: WssState,
    settle_delay: Duration,
    retry: RetryPolicy,
}

impl<T: NetconfTransport> Roadm<T> {
    /// Opens `name` over an established `session`.
    ///
    /// The device must be listed in `config`, and `guard` must approve its
    /// patch (`<name>_p1`, `<name>_line`). Both checks happen before the
    /// session is used.
    ///
    /// # Errors
    ///
    /// [`WdmError::UnknownDevice`] or [`WdmError::Authorization`].
    #[instrument(skip(config, guard, session))]
    pub fn open(
        name: &str,
        config: &TestbedConfig,
        guard: &dyn AccessGuard,
        session: T,
    ) -> WdmResult<Self> {
        let endpoint = config.device(name)?;

        let patches = TestbedConfig::patch_for(name);
        if !guard.is_authorized(&patches) {
            warn!("Access to {} denied", name);
            return Err(WdmError::Authorization {
                device: name.to_string(),
                patches,
            });
        }

        info!("Opened ROADM {} at {}:{}", name, endpoint.host, endpoint.port);
        Ok(Self {
            name: name.to_string(),
            session,
            state: WssState::new(),
            settle_delay: config.settle_delay(),
            retry: RetryPolicy::new(config.telemetry_retries, Duration::ZERO),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last snapshot read from the device.
    pub fn state(&self) -> &WssState {
        &self.state
    }

    pub fn session(&self) -> &T {
        &self.session
    }

    pub fn into_session(self) -> T {
        self.session
    }

    /// Connection writer over this device's session.
    pub fn reconciler(&mut self) -> ConnectionReconciler<'_, T> {
        self.state.invalidate_connections();
        ConnectionReconciler::new(&mut self.session)
    }

    /// Amplifier controller using the configured settle delay and retry
    /// budget.
    pub fn edfa(&mut self) -> EdfaController<'_, T> {
        EdfaController::new(&mut self.session, self.settle_delay, self.retry)
    }

    /// Runs a connection write and drops the cached connection table.
    fn write<R>(
        &mut self,
        op: impl FnOnce(&mut ConnectionReconciler<'_, T>) -> WdmResult<R>,
    ) -> WdmResult<R> {
        let result = op(&mut ConnectionReconciler::new(&mut self.session));
        self.state.invalidate_connections();
        result
    }

    // ===== Plan operations =====

    /// Replaces the connections of `target` with a uniform 95-channel grid.
    ///
    /// MUX connections run from `in_port` to the line, DEMUX connections
    /// from the line to `out_port`. With [`GridTarget::Both`] both plans are
    /// generated first and MUX is applied before DEMUX.
    #[instrument(skip(self, options), fields(device = %self.name, grid = ?target))]
    pub fn make_grid(
        &mut self,
        target: GridTarget,
        in_port: u16,
        out_port: u16,
        options: &GridOptions,
    ) -> WdmResult<()> {
        let plans = target
            .modules()
            .iter()
            .map(|&module| {
                let (input, output) = match module {
                    WssModule::Mux => (in_port, module.common_port()),
                    WssModule::Demux => (module.common_port(), out_port),
                };
                PlanGenerator::new(module)
                    .uniform_grid(input, output, options)
                    .map(|plan| (module, plan))
            })
            .collect::<WdmResult<Vec<_>>>()?;

        for (module, plan) in plans {
            self.write(|r| r.apply(module.id(), &plan))?;
        }
        Ok(())
    }

    /// Replaces the MUX connections with explicit windows.
    pub fn apply_mux_grid(&mut self, entries: &[GridEntry]) -> WdmResult<()> {
        self.apply_grid_entries(WssModule::Mux, entries)
    }

    /// Replaces the DEMUX connections with explicit windows.
    pub fn apply_demux_grid(&mut self, entries: &[GridEntry]) -> WdmResult<()> {
        self.apply_grid_entries(WssModule::Demux, entries)
    }

    fn apply_grid_entries(&mut self, module: WssModule, entries: &[GridEntry]) -> WdmResult<()> {
        let plan = PlanGenerator::new(module).grid_entries(entries)?;
        self.write(|r| r.apply(module.id(), &plan))
    }

    /// Flex-grid plan for the MUX; offsets are add ports (4100 + offset).
    pub fn operator_flex_grid_mux_connections(
        &self,
        plan: &FlexGridPlan,
        options: &GridOptions,
    ) -> WdmResult<Vec<ConnectionSpec>> {
        PlanGenerator::new(WssModule::Mux).flex_grid(plan, options)
    }

    /// Flex-grid plan for the DEMUX; offsets are drop ports (5200 + offset).
    pub fn operator_flex_grid_demux_connections(
        &self,
        plan: &FlexGridPlan,
        options: &GridOptions,
    ) -> WdmResult<Vec<ConnectionSpec>> {
        PlanGenerator::new(WssModule::Demux).flex_grid(plan, options)
    }

    /// Generates and applies a flex grid on one module.
    #[instrument(skip(self, plan, options), fields(device = %self.name, module = module_id))]
    pub fn apply_flex_grid(
        &mut self,
        module_id: u8,
        plan: &FlexGridPlan,
        options: &GridOptions,
    ) -> WdmResult<()> {
        let connections = PlanGenerator::for_module(module_id)?.flex_grid(plan, options)?;
        self.write(|r| r.apply(module_id, &connections))
    }

    /// Applies an already generated plan to one module.
    pub fn apply_connections(
        &mut self,
        module_id: u8,
        connections: &[ConnectionSpec],
    ) -> WdmResult<()> {
        self.write(|r| r.apply(module_id, connections))
    }

    pub fn delete_connection(&mut self, module_id: u8, connection_id: &str) -> WdmResult<()> {
        self.write(|r| r.delete_connection(module_id, connection_id))
    }

    // ===== Per-connection patches =====

    pub fn set_mux_block(&mut self, connection_id: &str) -> WdmResult<()> {
        self.set_blocked(WssModule::Mux, connection_id, true)
    }

    pub fn set_mux_unblock(&mut self, connection_id: &str) -> WdmResult<()> {
        self.set_blocked(WssModule::Mux, connection_id, false)
    }

    pub fn set_demux_block(&mut self, connection_id: &str) -> WdmResult<()> {
        self.set_blocked(WssModule::Demux, connection_id, true)
    }

    pub fn set_demux_unblock(&mut self, connection_id: &str) -> WdmResult<()> {
        self.set_blocked(WssModule::Demux, connection_id, false)
    }

    fn set_blocked(&mut self, module: WssModule, connection_id: &str, blocked: bool) -> WdmResult<()> {
        let states = [(connection_id.to_string(), blocked)];
        self.write(|r| r.patch_blocked(module.id(), &states))
    }

    pub fn set_mux_atten(&mut self, connection_id: &str, attenuation: f64) -> WdmResult<()> {
        self.set_atten(WssModule::Mux, connection_id, attenuation)
    }

    pub fn set_demux_atten(&mut self, connection_id: &str, attenuation: f64) -> WdmResult<()> {
        self.set_atten(WssModule::Demux, connection_id, attenuation)
    }

    fn set_atten(&mut self, module: WssModule, connection_id: &str, attenuation: f64) -> WdmResult<()> {
        let values = [(connection_id.to_string(), attenuation)];
        self.write(|r| r.patch_attenuation(module.id(), &values))
    }

    /// Sets the blocked flag of several MUX connections in one edit.
    pub fn set_mux_block_status(&mut self, states: &[(String, bool)]) -> WdmResult<()> {
        self.write(|r| r.patch_blocked(WssModule::Mux.id(), states))
    }

    /// Sets the blocked flag of several DEMUX connections in one edit.
    pub fn set_demux_block_status(&mut self, states: &[(String, bool)]) -> WdmResult<()> {
        self.write(|r| r.patch_blocked(WssModule::Demux.id(), states))
    }

    /// Moves a MUX connection to add port `4100 + offset`.
    pub fn set_mux_port(&mut self, connection_id: &str, offset: u16) -> WdmResult<()> {
        let port = WssModule::Mux.port_for_offset(offset);
        self.write(|r| r.set_port(WssModule::Mux.id(), connection_id, port))
    }

    /// Moves a DEMUX connection to drop port `5200 + offset`.
    pub fn set_demux_port(&mut self, connection_id: &str, offset: u16) -> WdmResult<()> {
        let port = WssModule::Demux.port_for_offset(offset);
        self.write(|r| r.set_port(WssModule::Demux.id(), connection_id, port))
    }

    // ===== Telemetry =====

    /// Re-reads the connection table of both modules.
    pub fn wss_get_connections(&mut self) -> WdmResult<&WssState> {
        self.state.refresh_connections(&mut self.session)?;
        Ok(&self.state)
    }

    /// `(id, dBm)` input power of every connection on `module_id`.
    pub fn connection_input_power(&mut self, module_id: u8) -> WdmResult<Vec<(u32, f64)>> {
        let module = resolve_module(module_id)?;
        self.state.refresh_connections(&mut self.session)?;
        Ok(self
            .state
            .connections(module)
            .iter()
            .map(|c| (c.id, c.input_power))
            .collect())
    }

    /// `(id, dBm)` output power of every connection on `module_id`.
    pub fn connection_output_power(&mut self, module_id: u8) -> WdmResult<Vec<(u32, f64)>> {
        let module = resolve_module(module_id)?;
        self.state.refresh_connections(&mut self.session)?;
        Ok(self
            .state
            .connections(module)
            .iter()
            .map(|c| (c.id, c.output_power))
            .collect())
    }

    /// Re-reads the OCM monitor points of both modules.
    pub fn monitored_channels(&mut self) -> WdmResult<&WssState> {
        self.state.refresh_monitored_channels(&mut self.session)?;
        Ok(&self.state)
    }

    /// `(id, dBm)` OCM power on `module_id`.
    pub fn monitored_power(&mut self, module_id: u8) -> WdmResult<Vec<(u32, f64)>> {
        let module = resolve_module(module_id)?;
        self.state.refresh_monitored_channels(&mut self.session)?;
        Ok(self
            .state
            .monitored_channels(module)
            .iter()
            .map(|m| (m.id, m.power))
            .collect())
    }

    pub fn ports_info(&mut self) -> WdmResult<&BTreeMap<u16, PortReading>> {
        self.state.refresh_ports(&mut self.session)?;
        Ok(self.state.ports())
    }

    /// Reads both amplifiers, retrying transient failures.
    pub fn edfa_info(&mut self) -> WdmResult<&EdfaPair> {
        let (state, session) = (&mut self.state, &mut self.session);
        retry_bounded("read edfas", self.retry, |_| state.refresh_edfa(&mut *session))?;
        self.state
            .edfa()
            .ok_or_else(|| WdmError::rpc("read edfas", "no amplifier data after refresh", ""))
    }
}

//! Applying connection plans to a WSS module.
//!
//! The device offers no differential update of its cross-connect table, so
//! [`ConnectionReconciler::apply`] always removes every connection of the
//! module and then adds the new set in one bulk edit. The two steps are not
//! atomic: if the add fails the module is left with no connections. Nothing
//! is rolled back and nothing is retried; the caller re-applies.
//!
//! `patch_attenuation`, `patch_blocked` and `set_port` change single
//! attributes of existing connections without the remove-all step.

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use wdm_common::{Datastore, NetconfTransport, RpcReply, WdmError, WdmResult};
use wdm_types::{WssModule, DEMUX_OUTPUT_PORTS, MUX_INPUT_PORTS};

use crate::commands;
use crate::connection::{
    resolve_module, validate_attenuation, validate_connection_id, ConnectionSpec,
};

/// Stage names carried by [`WdmError::Reconcile`].
pub mod stages {
    pub const REMOVE_ALL: &str = "remove-all";
    pub const BULK_ADD: &str = "bulk-add";
    pub const PATCH_ATTENUATION: &str = "patch-attenuation";
    pub const PATCH_BLOCKED: &str = "patch-blocked";
    pub const SET_PORT: &str = "set-port";
    pub const DELETE: &str = "delete-connection";
}

/// Issues connection writes over a borrowed session.
pub struct ConnectionReconciler<'a, T: ?Sized> {
    session: &'a mut T,
}

impl<'a, T: NetconfTransport + ?Sized> ConnectionReconciler<'a, T> {
    pub fn new(session: &'a mut T) -> Self {
        Self { session }
    }

    /// Replaces every connection of `module_id` with `connections`.
    ///
    /// All input is validated before the first request: the module number,
    /// that every connection belongs to that module, and that connection
    /// ids are unique. An empty plan only removes.
    ///
    /// # Errors
    ///
    /// - [`WdmError::Validation`] for bad input; no request was sent.
    /// - [`WdmError::Reconcile`] naming the stage that was not acknowledged.
    ///   After a failed `bulk-add` the module has no connections.
    #[instrument(skip(self, connections), fields(module = module_id, connections = connections.len()))]
    pub fn apply(&mut self, module_id: u8, connections: &[ConnectionSpec]) -> WdmResult<()> {
        let module = resolve_module(module_id)?;
        validate_plan(module, connections)?;

        let attempted = connections.len();
        let reply = self.session.dispatch(&commands::remove_all_rpc(module));
        expect_ok(module.as_str(), stages::REMOVE_ALL, attempted, reply)?;
        debug!("Removed all connections on {}", module);

        if connections.is_empty() {
            info!("Cleared {}", module);
            return Ok(());
        }

        let reply = self
            .session
            .edit_config(Datastore::Running, &commands::bulk_add_config(connections));
        expect_ok(module.as_str(), stages::BULK_ADD, attempted, reply)?;

        info!("Applied {} connections to {}", attempted, module);
        Ok(())
    }

    /// Sets the attenuation of each listed connection, leaving every other
    /// attribute and connection untouched.
    #[instrument(skip(self, values), fields(module = module_id, count = values.len()))]
    pub fn patch_attenuation(&mut self, module_id: u8, values: &[(String, f64)]) -> WdmResult<()> {
        let module = resolve_module(module_id)?;
        for (id, atten) in values {
            validate_connection_id(id)?;
            validate_attenuation(id, *atten)?;
        }
        if values.is_empty() {
            return Ok(());
        }

        let reply = self.session.edit_config(
            Datastore::Running,
            &commands::attenuation_patch_config(module, values),
        );
        expect_ok(module.as_str(), stages::PATCH_ATTENUATION, values.len(), reply)?;
        debug!("Patched attenuation of {} connections", values.len());
        Ok(())
    }

    /// Sets the blocked flag of each listed connection.
    #[instrument(skip(self, states), fields(module = module_id, count = states.len()))]
    pub fn patch_blocked(&mut self, module_id: u8, states: &[(String, bool)]) -> WdmResult<()> {
        let module = resolve_module(module_id)?;
        for (id, _) in states {
            validate_connection_id(id)?;
        }
        if states.is_empty() {
            return Ok(());
        }

        let reply = self.session.edit_config(
            Datastore::Running,
            &commands::blocked_patch_config(module, states),
        );
        expect_ok(module.as_str(), stages::PATCH_BLOCKED, states.len(), reply)?;
        debug!("Patched blocked flag of {} connections", states.len());
        Ok(())
    }

    /// Rebinds the add port (MUX) or drop port (DEMUX) of one connection.
    #[instrument(skip(self), fields(module = module_id, connection = %connection_id, port = port))]
    pub fn set_port(&mut self, module_id: u8, connection_id: &str, port: u16) -> WdmResult<()> {
        let module = resolve_module(module_id)?;
        validate_connection_id(connection_id)?;
        let (valid, expected) = match module {
            WssModule::Mux => (MUX_INPUT_PORTS.contains(&port), "4101-4120"),
            WssModule::Demux => (DEMUX_OUTPUT_PORTS.contains(&port), "5201-5220"),
        };
        if !valid {
            return Err(WdmError::validation(
                "port",
                format!("port {} on {}: expected {}", port, module, expected),
            ));
        }

        let reply = self
            .session
            .dispatch(&commands::set_port_rpc(module, connection_id, port));
        expect_ok(module.as_str(), stages::SET_PORT, 1, reply)?;
        debug!("Moved connection {} to port {}", connection_id, port);
        Ok(())
    }

    /// Deletes a single connection.
    #[instrument(skip(self), fields(module = module_id, connection = %connection_id))]
    pub fn delete_connection(&mut self, module_id: u8, connection_id: &str) -> WdmResult<()> {
        let module = resolve_module(module_id)?;
        validate_connection_id(connection_id)?;

        let reply = self
            .session
            .dispatch(&commands::delete_connection_rpc(module, connection_id));
        expect_ok(module.as_str(), stages::DELETE, 1, reply)?;
        debug!("Deleted connection {}", connection_id);
        Ok(())
    }
}

fn validate_plan(module: WssModule, connections: &[ConnectionSpec]) -> WdmResult<()> {
    let mut seen = HashSet::with_capacity(connections.len());
    for conn in connections {
        if conn.module() != module {
            return Err(WdmError::validation(
                "module",
                format!(
                    "connection {} belongs to {}, not {}",
                    conn.connection_id(),
                    conn.module(),
                    module
                ),
            ));
        }
        if !seen.insert(conn.connection_id()) {
            return Err(WdmError::validation(
                "connection_id",
                format!(
                    "connection id {} appears twice on {}",
                    conn.connection_id(),
                    module
                ),
            ));
        }
    }
    Ok(())
}

/// Turns a write outcome into a [`WdmError::Reconcile`] unless the device
/// acknowledged it. `entity` names the module or amplifier written to.
pub(crate) fn expect_ok(
    entity: &str,
    stage: &str,
    attempted: usize,
    reply: WdmResult<RpcReply>,
) -> WdmResult<()> {
    match reply {
        Ok(reply) if reply.is_ok() => Ok(()),
        Ok(reply) => {
            warn!(entity = entity, stage = stage, "Device rejected write: {}", reply.raw());
            Err(WdmError::reconcile(entity, stage, attempted, reply.raw()))
        }
        Err(e) => {
            warn!(entity = entity, stage = stage, "Write failed: {}", e);
            let detail = match e.raw_payload() {
                Some(payload) if !payload.is_empty() => payload.to_string(),
                _ => e.to_string(),
            };
            Err(WdmError::reconcile(entity, stage, attempted, detail))
        }
    }
}

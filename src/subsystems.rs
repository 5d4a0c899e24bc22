//! Schema registration: the ordered list of steps that build the roster database.
//!
//! Adding a table or view: append one entry to `SCHEMA_STEPS` after everything
//! it references.

use crate::core::error::RosterError;
use crate::core::schemas;
use crate::core::store::Store;

pub(crate) struct SchemaStep {
    /// Step identifier, recorded as the audit `op` (`init.<name>`).
    pub name: &'static str,
    pub ddl: &'static [&'static str],
}

/// Referenced tables come before the tables that reference them.
pub(crate) const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep { name: "destinations", ddl: &[schemas::DESTINATIONS_TABLE] },
    SchemaStep { name: "terminals", ddl: &[schemas::TERMINALS_TABLE] },
    SchemaStep { name: "pilots", ddl: &[schemas::PILOTS_TABLE] },
    SchemaStep { name: "flights", ddl: &[schemas::FLIGHTS_TABLE] },
    SchemaStep {
        name: "crew_indexes",
        ddl: &[schemas::FLIGHTS_INDEX_CAPTAIN, schemas::FLIGHTS_INDEX_FIRST_OFFICER],
    },
    SchemaStep {
        name: "performance_views",
        ddl: &[schemas::DEPARTURE_PERFORMANCE_VIEW, schemas::ARRIVAL_PERFORMANCE_VIEW],
    },
];

/// Create the roster schema. Each step commits on its own, so a failure
/// leaves the earlier steps in place and reports which step failed.
///
/// With `reset`, existing views and tables are dropped first, dependents
/// before dependencies. Without it, existing objects are left untouched.
pub fn initialize_db(store: &Store, reset: bool) -> Result<Vec<&'static str>, RosterError> {
    let broker = store.broker();
    if reset {
        broker.with_bootstrap("init.reset", |conn| {
            for stmt in schemas::DROP_STATEMENTS {
                conn.execute(stmt, [])?;
            }
            Ok(())
        })?;
    }

    let mut done = Vec::with_capacity(SCHEMA_STEPS.len());
    for step in SCHEMA_STEPS {
        let op = format!("init.{}", step.name);
        broker.with_bootstrap(&op, |conn| {
            for ddl in step.ddl {
                conn.execute(ddl, [])?;
            }
            Ok(())
        })?;
        done.push(step.name);
    }
    Ok(done)
}

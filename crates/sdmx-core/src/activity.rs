//! Activity aggregation: runs every query of an activity and reconciles
//! their outputs into one descriptor and one shared dimension set.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use sdmx_common::{column_names, constant_column};
use sdmx_model::{
    ActivityConfig, ActivityDescriptor, ConfigError, FIXED_COLUMNS, NOT_APPLICABLE, QueryGroup,
    QueryId, QueryPeriodicity,
};
use tracing::{error, info, info_span, warn};

use crate::context::PipelineContext;
use crate::error::Result;
use crate::layout::{DataStage, write_descriptor, write_frame};
use crate::query::QueryOutcome;

/// A query that was skipped after a non-fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFailure {
    pub id: QueryId,
    pub message: String,
}

/// A query whose dimension set differs from the rest of its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDiscrepancy {
    pub group: String,
    pub query_id: String,
    /// Columns other queries of the group have and this one lacks.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ActivityOutcome {
    pub name: String,
    pub descriptor: ActivityDescriptor,
    pub queries: Vec<QueryOutcome>,
    pub failures: Vec<QueryFailure>,
    pub discrepancies: Vec<GroupDiscrepancy>,
}

impl ActivityOutcome {
    pub fn rows_written(&self) -> usize {
        self.queries.iter().map(QueryOutcome::rows_written).sum()
    }

    pub fn new_map_entries(&self) -> usize {
        self.queries.iter().map(|query| query.new_map_entries).sum()
    }
}

/// Outcome of a whole run, one entry per processed activity.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub activities: Vec<ActivityOutcome>,
}

impl RunSummary {
    pub fn failed_queries(&self) -> usize {
        self.activities
            .iter()
            .map(|activity| activity.failures.len())
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_queries() > 0
    }
}

impl PipelineContext<'_> {
    /// Run the named activities in order, or every configured activity when
    /// `names` is empty. A fatal error stops the run.
    pub fn run(&mut self, names: &[String]) -> Result<RunSummary> {
        let names: Vec<String> = if names.is_empty() {
            self.config.activities.keys().cloned().collect()
        } else {
            names.to_vec()
        };
        let mut summary = RunSummary::default();
        for name in &names {
            summary.activities.push(self.run_activity(name)?);
        }
        Ok(summary)
    }

    /// Run every query of `name` and aggregate the results.
    ///
    /// Query failures are recorded and the activity continues; only a
    /// fatal error is returned.
    pub fn run_activity(&mut self, name: &str) -> Result<ActivityOutcome> {
        let settings = self
            .config
            .activity(name)
            .cloned()
            .ok_or_else(|| ConfigError::Invalid {
                key: "activities".to_string(),
                message: format!("unknown activity '{name}'"),
            })?;
        let _span = info_span!("activity", name).entered();
        info!(queries = settings.queries.len(), "running activity");

        let mut queries = Vec::with_capacity(settings.queries.len());
        let mut failures = Vec::new();
        for raw_id in &settings.queries {
            let _query_span = info_span!("query", id = %raw_id).entered();
            match self.run_query(name, &settings, raw_id) {
                Ok(outcome) => queries.push(outcome),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    error!(error = %err, "query failed");
                    failures.push(QueryFailure {
                        id: QueryId::from_configured(raw_id),
                        message: err.to_string(),
                    });
                }
            }
        }

        let descriptor = build_descriptor(name, &settings, &queries);
        if queries.is_empty() {
            warn!("no query succeeded, descriptor not written");
        } else {
            write_descriptor(&self.layout.descriptor_path(name), &descriptor)?;
            for query in &queries {
                let extended = extend_with_not_applicable(&query.processed, &descriptor.variables)?;
                write_frame(
                    &self.layout.data_path(name, DataStage::Extended, &query.id),
                    &extended,
                )?;
            }
        }

        let discrepancies = check_group_consistency(&descriptor.grupos_consultas, &queries);
        for discrepancy in &discrepancies {
            warn!(
                group = %discrepancy.group,
                query_id = %discrepancy.query_id,
                missing = ?discrepancy.missing,
                "dimensions differ within query group"
            );
        }
        info!(
            succeeded = queries.len(),
            failed = failures.len(),
            variables = descriptor.variables.len(),
            "activity finished"
        );

        Ok(ActivityOutcome {
            name: name.to_string(),
            descriptor,
            queries,
            failures,
            discrepancies,
        })
    }
}

/// Group queries by metadata title; ids are 1-based in first-seen order.
pub fn group_queries(queries: &[QueryOutcome]) -> Vec<(String, QueryGroup)> {
    let mut groups: Vec<(String, QueryGroup)> = Vec::new();
    for query in queries {
        let title = &query.metadata.title;
        match groups.iter_mut().find(|(name, _)| name == title) {
            Some((_, group)) => group.consultas.push(query.id.to_string()),
            None => {
                let id = (groups.len() + 1).to_string();
                groups.push((
                    title.clone(),
                    QueryGroup {
                        id,
                        consultas: vec![query.id.to_string()],
                    },
                ));
            }
        }
    }
    groups
}

/// Union of the non-fixed columns of every query, in first-seen order.
pub fn activity_variables(queries: &[QueryOutcome]) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    for column in queries.iter().flat_map(QueryOutcome::columns) {
        if !FIXED_COLUMNS.contains(&column.as_str()) && !variables.contains(&column) {
            variables.push(column);
        }
    }
    variables
}

/// Add a `_Z` column for every variable `df` lacks, in `variables` order.
pub fn extend_with_not_applicable(
    df: &DataFrame,
    variables: &[String],
) -> polars::prelude::PolarsResult<DataFrame> {
    let present = column_names(df);
    let mut extended = df.clone();
    let height = df.height();
    for variable in variables.iter().filter(|variable| !present.contains(variable)) {
        extended.with_column(constant_column(variable, NOT_APPLICABLE, height))?;
    }
    Ok(extended)
}

/// Compare the column sets of the queries in each group.
///
/// Every query lacking a column that another member of its group has is
/// reported once.
pub fn check_group_consistency(
    groups: &[(String, QueryGroup)],
    queries: &[QueryOutcome],
) -> Vec<GroupDiscrepancy> {
    let mut discrepancies = Vec::new();
    for (title, group) in groups {
        let members: Vec<(&QueryOutcome, BTreeSet<String>)> = queries
            .iter()
            .filter(|query| group.consultas.contains(&query.id.to_string()))
            .map(|query| (query, query.columns().into_iter().collect()))
            .collect();
        let union: BTreeSet<String> = members
            .iter()
            .flat_map(|(_, columns)| columns.iter().cloned())
            .collect();
        for (query, columns) in &members {
            let missing: Vec<String> = union.difference(columns).cloned().collect();
            if !missing.is_empty() {
                discrepancies.push(GroupDiscrepancy {
                    group: title.clone(),
                    query_id: query.id.to_string(),
                    missing,
                });
            }
        }
    }
    discrepancies
}

/// Consolidated descriptor for the queries that succeeded.
pub fn build_descriptor(
    name: &str,
    settings: &ActivityConfig,
    queries: &[QueryOutcome],
) -> ActivityDescriptor {
    let mut descriptor = ActivityDescriptor {
        nombre: name.to_string(),
        categoria: settings.category.clone(),
        subcategoria: settings.subcategory.clone(),
        grupos_consultas: group_queries(queries),
        variables: activity_variables(queries),
        ..ActivityDescriptor::default()
    };
    for query in queries {
        let id = query.id.to_string();
        descriptor.periodicidad.insert(
            id.clone(),
            QueryPeriodicity {
                frecuencia: query.metadata.periodicity.clone(),
                valid_from: query.window.map(|window| window.valid_from()),
                valid_to: query.window.map(|window| window.valid_to()),
            },
        );
        descriptor
            .metadatos_title
            .insert(id.clone(), query.metadata.title.clone());
        descriptor
            .metadatos_subtitle
            .insert(id, query.metadata.subtitle.clone());
    }
    descriptor
}

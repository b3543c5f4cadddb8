//! The fixed, ordered list of files a migration loads.
//!
//! Order matters: later tables reference rows committed by earlier ones.

use serde::Serialize;

use crate::transform::Table;

/// Where a plan entry is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Hand-written script, executed as-is.
    Scripts,
    /// Legacy table dump.
    Dumps,
}

/// One file of the migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub file: &'static str,
    pub source: Source,
    /// Table rewrite applied after statement filtering.
    #[serde(serialize_with = "serialize_table")]
    pub table: Option<Table>,
}

fn serialize_table<S: serde::Serializer>(table: &Option<Table>, s: S) -> Result<S::Ok, S::Error> {
    match table {
        Some(t) => s.serialize_some(t.name()),
        None => s.serialize_none(),
    }
}

impl PlanEntry {
    /// A script from the scripts folder, executed without rewriting.
    pub const fn script(file: &'static str) -> Self {
        Self {
            file,
            source: Source::Scripts,
            table: None,
        }
    }

    /// A dump that is only filtered.
    pub const fn dump(file: &'static str) -> Self {
        Self {
            file,
            source: Source::Dumps,
            table: None,
        }
    }

    /// A dump that is filtered and then rewritten for `table`.
    pub const fn table(table: Table, file: &'static str) -> Self {
        Self {
            file,
            source: Source::Dumps,
            table: Some(table),
        }
    }

    /// Dumps are filtered and persisted; scripts are executed verbatim.
    pub fn is_rewritten(&self) -> bool {
        self.source == Source::Dumps
    }

    /// Stem of the persisted file, before the suffix and extension.
    pub fn output_stem(&self) -> String {
        let stem = self.file.strip_suffix(".sql").unwrap_or(self.file);
        match self.table {
            Some(Table::MecanismosDeFallo) => "hitachi_mecanismosdefallo".to_string(),
            _ => stem.to_string(),
        }
    }

    /// Name of the persisted file for the given suffix.
    pub fn output_file(&self, suffix: &str) -> String {
        format!("{}{}.sql", self.output_stem(), suffix)
    }
}

/// An ordered sequence of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    entries: Vec<PlanEntry>,
}

impl MigrationPlan {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by file name.
    pub fn find(&self, file: &str) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.file == file)
    }
}

impl Default for MigrationPlan {
    /// The GSMAO load order.
    fn default() -> Self {
        Self::new(vec![
            PlanEntry::script("limpiar_BBDD.sql"),
            PlanEntry::dump("hitachi_empresas.sql"),
            PlanEntry::table(Table::Plantas, "hitachi_plantas.sql"),
            PlanEntry::table(Table::CentrosCostes, "hitachi_centrosdecostes.sql"),
            PlanEntry::table(Table::Localizaciones, "hitachi_localizaciones.sql"),
            PlanEntry::table(Table::MecanismosDeFallo, "hitachi_tiposincidencias.sql"),
            PlanEntry::table(Table::Incidencias, "hitachi_incidencias.sql"),
            PlanEntry::table(Table::Resoluciones, "hitachi_resoluciones.sql"),
            PlanEntry::table(Table::Activos, "hitachi_activos.sql"),
            PlanEntry::table(Table::Componentes, "hitachi_componentes.sql"),
            PlanEntry::dump("hitachi_activo_componentes.sql"),
            PlanEntry::table(Table::EstadosOrden, "hitachi_estados.sql"),
            PlanEntry::table(Table::TiposOrdenes, "hitachi_tipos_ordenes.sql"),
            PlanEntry::table(Table::Ordenes, "hitachi_ordenes.sql"),
            PlanEntry::table(Table::IncidenciasOrdenes, "hitachi_orden_incidencias_resolucion.sql"),
            PlanEntry::table(Table::UsuariosOrdenes, "hitachi_usuarios_orden.sql"),
            PlanEntry::table(
                Table::HistorialUsuariosOrdenes,
                "hitachi_historial_modificaciones_usuarios_ordenes.sql",
            ),
        ])
    }
}

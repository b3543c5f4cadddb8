//! Per-table rewrites of dump scripts.
//!
//! Every legacy table has one [`Table`] entry, and each entry maps to one of
//! three rewrite shapes ([`Transform`]):
//!
//! - **InjectColumns**: the first identifier of every `INSERT INTO` line is
//!   replaced by the new table name followed by an explicit column list.
//!   Row tuples are left untouched.
//! - **Rename**: only the table identifier of `LOCK TABLES` and `INSERT INTO`
//!   lines changes.
//! - **Restructure**: every row tuple is tokenized, bound to its legacy
//!   layout and rebuilt in the new column order, with lookups applied.
//!
//! All shapes work line by line. Lines they do not recognise pass through
//! unchanged.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::ast::{InsertStatement, RowTuple, SqlValue, StatementKind};
use crate::error::{MigrateError, MigrateResult};
use crate::lookup::{LookupTable, Lookups};
use crate::parser::parse_insert;
use crate::schema::{self, Layout, Record, TargetTable};
use crate::transpiler::{qualified_identifier, replace_first_identifier, ToSql};

/// Keep only `LOCK TABLES`, `INSERT INTO` and `UNLOCK TABLES` lines.
pub fn filter_statements(script: &str) -> String {
    script
        .lines()
        .filter(|line| StatementKind::of(line).is_kept())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A legacy table with a dedicated rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Plantas,
    Componentes,
    Incidencias,
    Resoluciones,
    MecanismosDeFallo,
    EstadosOrden,
    TiposOrdenes,
    CentrosCostes,
    Localizaciones,
    Activos,
    Ordenes,
    IncidenciasOrdenes,
    UsuariosOrdenes,
    HistorialUsuariosOrdenes,
}

impl Table {
    pub const ALL: [Table; 14] = [
        Table::Plantas,
        Table::Componentes,
        Table::Incidencias,
        Table::Resoluciones,
        Table::MecanismosDeFallo,
        Table::EstadosOrden,
        Table::TiposOrdenes,
        Table::CentrosCostes,
        Table::Localizaciones,
        Table::Activos,
        Table::Ordenes,
        Table::IncidenciasOrdenes,
        Table::UsuariosOrdenes,
        Table::HistorialUsuariosOrdenes,
    ];

    /// Short name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Table::Plantas => "plantas",
            Table::Componentes => "componentes",
            Table::Incidencias => "incidencias",
            Table::Resoluciones => "resoluciones",
            Table::MecanismosDeFallo => "mecanismosdefallo",
            Table::EstadosOrden => "estadosorden",
            Table::TiposOrdenes => "tiposordenes",
            Table::CentrosCostes => "centroscostes",
            Table::Localizaciones => "localizaciones",
            Table::Activos => "activos",
            Table::Ordenes => "ordenes",
            Table::IncidenciasOrdenes => "incidenciasordenes",
            Table::UsuariosOrdenes => "usuariosordenes",
            Table::HistorialUsuariosOrdenes => "historialusuariosordenes",
        }
    }

    /// Legacy dump file that holds this table.
    pub fn dump_file(self) -> &'static str {
        match self {
            Table::Plantas => "hitachi_plantas.sql",
            Table::Componentes => "hitachi_componentes.sql",
            Table::Incidencias => "hitachi_incidencias.sql",
            Table::Resoluciones => "hitachi_resoluciones.sql",
            Table::MecanismosDeFallo => "hitachi_tiposincidencias.sql",
            Table::EstadosOrden => "hitachi_estados.sql",
            Table::TiposOrdenes => "hitachi_tipos_ordenes.sql",
            Table::CentrosCostes => "hitachi_centrosdecostes.sql",
            Table::Localizaciones => "hitachi_localizaciones.sql",
            Table::Activos => "hitachi_activos.sql",
            Table::Ordenes => "hitachi_ordenes.sql",
            Table::IncidenciasOrdenes => "hitachi_orden_incidencias_resolucion.sql",
            Table::UsuariosOrdenes => "hitachi_usuarios_orden.sql",
            Table::HistorialUsuariosOrdenes => {
                "hitachi_historial_modificaciones_usuarios_ordenes.sql"
            }
        }
    }

    /// Find the table whose dump file has the given name.
    pub fn for_file(file: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.dump_file() == file)
    }

    /// The rewrite shape for this table.
    pub fn transform(self) -> Transform {
        match self {
            Table::Plantas => Transform::InjectColumns {
                target: schema::PLANTAS,
                rename_lock: false,
            },
            Table::Componentes => Transform::InjectColumns {
                target: schema::COMPONENTES,
                rename_lock: false,
            },
            Table::Incidencias => Transform::InjectColumns {
                target: schema::INCIDENCIAS,
                rename_lock: false,
            },
            Table::Resoluciones => Transform::InjectColumns {
                target: schema::RESOLUCIONES,
                rename_lock: false,
            },
            Table::MecanismosDeFallo => Transform::InjectColumns {
                target: schema::MECANISMOS_DE_FALLO,
                rename_lock: true,
            },
            Table::EstadosOrden => Transform::Rename {
                table: schema::ESTADOS_ORDEN,
            },
            Table::TiposOrdenes => Transform::Rename {
                table: schema::TIPOS_ORDEN,
            },
            Table::CentrosCostes => Transform::Restructure {
                rows: RowRule::CentrosCostes,
                rename_lock: false,
            },
            Table::Localizaciones => Transform::Restructure {
                rows: RowRule::Localizaciones,
                rename_lock: false,
            },
            Table::Activos => Transform::Restructure {
                rows: RowRule::Activos,
                rename_lock: false,
            },
            Table::Ordenes => Transform::Restructure {
                rows: RowRule::Ordenes,
                rename_lock: false,
            },
            Table::IncidenciasOrdenes => Transform::Restructure {
                rows: RowRule::IncidenciasOrdenes,
                rename_lock: true,
            },
            Table::UsuariosOrdenes => Transform::Restructure {
                rows: RowRule::UsuariosOrdenes,
                rename_lock: true,
            },
            Table::HistorialUsuariosOrdenes => Transform::Restructure {
                rows: RowRule::HistorialUsuariosOrdenes,
                rename_lock: true,
            },
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Table {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Table::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| MigrateError::Config(format!("Unknown table '{}'", s)))
    }
}

/// How a script is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Insert an explicit column list after the table identifier.
    InjectColumns {
        target: TargetTable,
        rename_lock: bool,
    },
    /// Rename the table on lock and insert lines.
    Rename { table: &'static str },
    /// Rebuild every row tuple.
    Restructure { rows: RowRule, rename_lock: bool },
}

impl Transform {
    /// Target table name written by this transform.
    pub fn target_name(&self) -> &'static str {
        match self {
            Transform::InjectColumns { target, .. } => target.name,
            Transform::Rename { table } => *table,
            Transform::Restructure { rows, .. } => rows.target().name,
        }
    }

    /// Short label for listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Transform::InjectColumns { .. } => "inject-columns",
            Transform::Rename { .. } => "rename",
            Transform::Restructure { .. } => "restructure",
        }
    }
}

/// Row-level rewrite for restructured tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRule {
    CentrosCostes,
    Localizaciones,
    Activos,
    Ordenes,
    IncidenciasOrdenes,
    UsuariosOrdenes,
    HistorialUsuariosOrdenes,
}

impl RowRule {
    pub fn layout(self) -> Layout {
        match self {
            RowRule::CentrosCostes => schema::CENTROS_COSTES_LEGACY,
            RowRule::Localizaciones => schema::LOCALIZACIONES_LEGACY,
            RowRule::Activos => schema::ACTIVOS_LEGACY,
            RowRule::Ordenes => schema::ORDENES_LEGACY,
            RowRule::IncidenciasOrdenes => schema::INCIDENCIAS_ORDENES_LEGACY,
            RowRule::UsuariosOrdenes => schema::USUARIOS_ORDENES_LEGACY,
            RowRule::HistorialUsuariosOrdenes => schema::HISTORIAL_USUARIOS_ORDENES_LEGACY,
        }
    }

    pub fn target(self) -> TargetTable {
        match self {
            RowRule::CentrosCostes => schema::CENTROS_COSTES,
            RowRule::Localizaciones => schema::LOCALIZACIONES,
            RowRule::Activos => schema::ACTIVOS,
            RowRule::Ordenes => schema::ORDENES,
            RowRule::IncidenciasOrdenes => schema::INCIDENCIAS_ORDENES,
            RowRule::UsuariosOrdenes => schema::USUARIOS_ORDENES,
            RowRule::HistorialUsuariosOrdenes => schema::HISTORIAL_USUARIOS_ORDENES,
        }
    }
}

/// Applies transforms with a fixed set of value dictionaries.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    lookups: Lookups,
}

impl Transformer {
    pub fn new(lookups: Lookups) -> Self {
        Self { lookups }
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    /// Rewrite a (filtered) dump script for the given table.
    pub fn apply(&self, table: Table, script: &str) -> MigrateResult<String> {
        self.run(&table.transform(), script)
    }

    /// Filter a raw dump, then apply the table rewrite if there is one.
    pub fn rewrite_dump(&self, table: Option<Table>, dump: &str) -> MigrateResult<String> {
        let filtered = filter_statements(dump);
        match table {
            Some(table) => self.apply(table, &filtered),
            None => Ok(filtered),
        }
    }

    /// Rewrite a script with an explicit transform.
    pub fn run(&self, transform: &Transform, script: &str) -> MigrateResult<String> {
        match *transform {
            Transform::InjectColumns {
                target,
                rename_lock,
            } => Ok(inject_columns(script, target, rename_lock)),
            Transform::Rename { table } => Ok(rename(script, table)),
            Transform::Restructure { rows, rename_lock } => {
                self.restructure(script, rows, rename_lock)
            }
        }
    }

    fn restructure(&self, script: &str, rule: RowRule, rename_lock: bool) -> MigrateResult<String> {
        let target = rule.target();
        let layout = rule.layout();
        let mut lines = Vec::new();

        for line in script.lines() {
            if line.contains("INSERT INTO") {
                let stmt = parse_insert(line)?;
                let source_rows = stmt.rows.len();

                let rows = stmt
                    .rows
                    .into_iter()
                    .map(|row| {
                        let record = layout.bind(row)?;
                        self.rewrite_row(rule, record)
                    })
                    .collect::<MigrateResult<Vec<_>>>()?;

                debug!(table = target.name, rows = source_rows, "Restructured insert");

                let columns = target.columns.iter().map(|c| c.to_string()).collect();
                lines.push(InsertStatement::new(target.name, columns, rows).to_sql());
            } else if rename_lock && line.contains("WRITE;") {
                lines.push(replace_first_identifier(line, &qualified_identifier(target.name, &[])));
            } else {
                lines.push(line.to_string());
            }
        }

        Ok(lines.join("\n"))
    }

    fn rewrite_row(&self, rule: RowRule, mut rec: Record) -> MigrateResult<RowTuple> {
        let values = match rule {
            RowRule::CentrosCostes => vec![
                rec.take("id")?,
                rec.take("descripcion_es")?,
                rec.take("descripcion_en")?,
                rec.take("centro_coste_sap")?,
                rec.take("planta")?,
            ],
            RowRule::Localizaciones => {
                rule.layout()
                    .fields
                    .iter()
                    .map(|field| rec.take(*field))
                    .collect::<MigrateResult<Vec<_>>>()?
            }
            RowRule::Activos => {
                let criticidad = translate(&self.lookups.criticality, rec.get("criticidad")?)?;
                let actividad = translate(&self.lookups.activity, rec.get("actividad")?)?;
                vec![
                    rec.take("id")?,
                    rec.take("activo_sap")?,
                    rec.take("descripcion_es")?.quoted(),
                    rec.take("descripcion_en")?.quoted(),
                    numeric(rec.take("redundancia")?),
                    numeric(rec.take("hse")?),
                    numeric(rec.take("usabilidad")?),
                    numeric(rec.take("coste")?),
                    numeric(rec.take("valor_criticidad")?.without("%")),
                    SqlValue::bare(criticidad),
                    rec.take("localizacion")?,
                    rec.take("centro_coste")?,
                    SqlValue::bare(actividad),
                ]
            }
            RowRule::Ordenes => {
                let creador = translate(&self.lookups.creators, rec.get("creador")?)?;
                vec![
                    rec.take("id")?,
                    rec.take("id_sap")?.quoted(),
                    rec.take("fecha_creacion")?.quoted(),
                    rec.take("fecha_apertura")?.quoted(),
                    rec.take("comentario_orden")?.quoted(),
                    rec.take("fecha_cierre")?.quoted(),
                    rec.take("comentario_resolucion")?.quoted(),
                    rec.take("tiempo_parada")?.quoted(),
                    rec.take("confirmada")?,
                    rec.take("activo")?,
                    rec.take("estado")?,
                    SqlValue::Quoted(creador),
                    rec.take("tipo_orden")?,
                    rec.take("materiales")?.quoted(),
                ]
            }
            RowRule::IncidenciasOrdenes => vec![
                rec.take("fecha_deteccion")?.quoted(),
                rec.take("orden")?,
                rec.take("componente")?,
                rec.take("incidencia")?,
                rec.take("resolucion")?,
                rec.take("fecha_resolucion")?.quoted(),
                rec.take("paro_maquina")?,
                rec.take("cambio_pieza")?,
                rec.take("afecta_produccion")?,
            ],
            RowRule::UsuariosOrdenes => vec![
                SqlValue::Quoted(translate(&self.lookups.users, rec.get("usuario")?)?),
                rec.take("orden")?,
            ],
            RowRule::HistorialUsuariosOrdenes => {
                let origen = self.optional_user(rec.get("usuario_origen")?)?;
                let destino = self.optional_user(rec.get("usuario_destino")?)?;
                vec![
                    rec.take("id")?,
                    rec.take("fecha_cambio")?,
                    rec.take("orden")?,
                    origen,
                    destino,
                ]
            }
        };

        Ok(RowTuple::new(values))
    }

    fn optional_user(&self, value: &SqlValue) -> MigrateResult<SqlValue> {
        if value.is_null() {
            Ok(SqlValue::Null)
        } else {
            Ok(SqlValue::Quoted(translate(&self.lookups.users, value)?))
        }
    }
}

fn translate(table: &LookupTable, value: &SqlValue) -> MigrateResult<String> {
    table.translate(value.lookup_key()).map(str::to_string)
}

/// Unquoted number; `NULL` and blanks become `0`.
fn numeric(value: SqlValue) -> SqlValue {
    value.or_default("0").unquoted()
}

fn inject_columns(script: &str, target: TargetTable, rename_lock: bool) -> String {
    let with_columns = qualified_identifier(target.name, target.columns);
    let bare = qualified_identifier(target.name, &[]);

    script
        .lines()
        .map(|line| {
            if line.contains("INSERT INTO") {
                replace_first_identifier(line, &with_columns)
            } else if rename_lock && line.contains("LOCK TABLE") {
                replace_first_identifier(line, &bare)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn rename(script: &str, table: &str) -> String {
    let identifier = qualified_identifier(table, &[]);

    script
        .lines()
        .map(|line| {
            if line.contains("LOCK TABLE") || line.contains("INSERT INTO") {
                replace_first_identifier(line, &identifier)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transformer() -> Transformer {
        Transformer::new(Lookups::default())
    }

    fn rows_of(script: &str) -> Vec<RowTuple> {
        let line = script
            .lines()
            .find(|l| l.contains("INSERT INTO"))
            .expect("insert line");
        parse_insert(line).unwrap().rows
    }

    const DUMP: &str = "\
-- MySQL dump 10.13
/*!40101 SET NAMES utf8 */;
DROP TABLE IF EXISTS `estados`;
LOCK TABLES `estados` WRITE;
/*!40000 ALTER TABLE `estados` DISABLE KEYS */;
INSERT INTO `estados` VALUES (1,'Abierta'),(2,'Cerrada');
/*!40000 ALTER TABLE `estados` ENABLE KEYS */;
UNLOCK TABLES;";

    #[test]
    fn test_filter_keeps_statements_in_order() {
        let filtered = filter_statements(DUMP);
        assert_eq!(
            filtered,
            "LOCK TABLES `estados` WRITE;\n\
             INSERT INTO `estados` VALUES (1,'Abierta'),(2,'Cerrada');\n\
             UNLOCK TABLES;"
        );

        let input: Vec<&str> = DUMP.lines().collect();
        let mut cursor = 0;
        for line in filtered.lines() {
            assert!(StatementKind::of(line).is_kept());
            let pos = input[cursor..].iter().position(|l| *l == line).unwrap();
            cursor += pos + 1;
        }
    }

    #[test]
    fn test_filter_empty_result() {
        assert_eq!(filter_statements("-- nothing\n/* here */"), "");
    }

    #[test]
    fn test_inject_columns() {
        let script = "LOCK TABLES `plantas` WRITE;\n\
                      INSERT INTO `plantas` VALUES (1,'Cordoba','x',37.8,-4.7,1);\n\
                      UNLOCK TABLES;";
        let out = transformer().apply(Table::Plantas, script).unwrap();
        assert_eq!(
            out,
            "LOCK TABLES `plantas` WRITE;\n\
             INSERT INTO `plantas` (Id, Descripcion, StmpConfig, Latitud, Longitud, IdEmpresa) VALUES (1,'Cordoba','x',37.8,-4.7,1);\n\
             UNLOCK TABLES;"
        );

        let stmt = parse_insert(out.lines().nth(1).unwrap()).unwrap();
        assert_eq!(stmt.columns.len(), schema::PLANTAS.arity());
    }

    #[test]
    fn test_mecanismos_renames_lock() {
        let script = "LOCK TABLES `tiposincidencias` WRITE;\n\
                      INSERT INTO `tiposincidencias` VALUES (1,'Electrico','Electrical');\n\
                      UNLOCK TABLES;";
        let out = transformer().apply(Table::MecanismosDeFallo, script).unwrap();
        assert_eq!(
            out,
            "LOCK TABLES `mecanismosdefallo` WRITE;\n\
             INSERT INTO `mecanismosdefallo` (Id, DescripcionES, DescripcionEN) VALUES (1,'Electrico','Electrical');\n\
             UNLOCK TABLES;"
        );
    }

    #[test]
    fn test_injection_column_counts() {
        for table in Table::ALL {
            if let Transform::InjectColumns { target, .. } = table.transform() {
                let script = "INSERT INTO `legacy` VALUES (1);";
                let out = transformer().apply(table, script).unwrap();
                let stmt = parse_insert(&out).unwrap();
                assert_eq!(stmt.columns.len(), target.arity(), "{}", table);
                assert_eq!(stmt.table, target.name);
            }
        }
    }

    #[test]
    fn test_rename_is_idempotent_on_identifier() {
        let script = filter_statements(DUMP);
        let once = transformer().apply(Table::EstadosOrden, &script).unwrap();
        let twice = transformer().apply(Table::EstadosOrden, &once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(
            once,
            "LOCK TABLES `estadosorden` WRITE;\n\
             INSERT INTO `estadosorden` VALUES (1,'Abierta'),(2,'Cerrada');\n\
             UNLOCK TABLES;"
        );
    }

    #[test]
    fn test_non_matching_lines_are_identity() {
        let script = "SET @a = 1;\n-- comment\nUNLOCK TABLES;";
        for table in Table::ALL {
            assert_eq!(transformer().apply(table, script).unwrap(), script, "{}", table);
        }
    }

    #[test]
    fn test_activos_scenario() {
        let script = "INSERT INTO `activos` VALUES (1,'A','B',5,NULL,NULL,NULL,NULL,'50%','MC',10,20,99,2);";
        let out = transformer().apply(Table::Activos, script).unwrap();
        assert_eq!(
            out,
            "INSERT INTO `activos` (Id, ActivoSAP, DescripcionES, DescripcionEN, Redundancia, Hse, \
             Usabilidad, Coste, ValorCriticidad, IdCriticidad, IdLocalizacion, IdCentroCoste, IdEstadoActivo) \
             VALUES (1,'A','B','5',0,0,0,0,50,1,10,20,3);"
        );

        let row = &rows_of(&out)[0];
        assert_eq!(row.len(), 13);
        assert_eq!(row.values[9], SqlValue::bare("1"));
        for value in &row.values[4..8] {
            assert_eq!(value, &SqlValue::bare("0"));
        }
        assert!(!row.values.contains(&SqlValue::bare("99")));
    }

    #[test]
    fn test_activos_quoted_numbers_and_null_criticality() {
        let script = "INSERT INTO `activos` VALUES (2,'S2','D','E','1','2','',3,NULL,NULL,1,1,5,'0');";
        let out = transformer().apply(Table::Activos, script).unwrap();
        let row = &rows_of(&out)[0];
        assert_eq!(
            row.values[4..10].to_vec(),
            vec![
                SqlValue::bare("1"),
                SqlValue::bare("2"),
                SqlValue::bare("0"),
                SqlValue::bare("3"),
                SqlValue::bare("0"),
                SqlValue::bare("5"),
            ]
        );
        assert_eq!(row.values[12], SqlValue::bare("1"));
    }

    #[test]
    fn test_activos_unknown_criticality_is_fatal() {
        let script = "INSERT INTO `activos` VALUES (1,'A','B','C',0,0,0,0,0,'ZZ',1,1,1,0);";
        let err = transformer().apply(Table::Activos, script).unwrap_err();
        assert!(matches!(err, MigrateError::LookupMiss { ref key, .. } if key == "ZZ"));
    }

    #[test]
    fn test_centros_costes_moves_sap_code() {
        let script = "LOCK TABLES `centrosdecostes` WRITE;\n\
                      INSERT INTO `centrosdecostes` VALUES (1,'CC01','Mantenimiento','Maintenance',2),(2,'CC02','Taller, norte','Workshop',2);\n\
                      UNLOCK TABLES;";
        let out = transformer().apply(Table::CentrosCostes, script).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "LOCK TABLES `centrosdecostes` WRITE;");
        assert_eq!(
            lines[1],
            "INSERT INTO `centrosdecostes` (Id, DescripcionES, DescripcionEN, CentroCosteSAP, IdPlanta) \
             VALUES (1,'Mantenimiento','Maintenance','CC01',2),(2,'Taller, norte','Workshop','CC02',2);"
        );
        assert_eq!(lines[2], "UNLOCK TABLES;");
    }

    #[test]
    fn test_localizaciones_keeps_order() {
        let script = "INSERT INTO `localizaciones` VALUES (1,'Nave','Hall','L1',NULL,NULL,'x@y.es',1);";
        let out = transformer().apply(Table::Localizaciones, script).unwrap();
        assert_eq!(
            out,
            "INSERT INTO `localizaciones` (Id, DescripcionES, DescripcionEN, LocalizacionSAP, Latitud, \
             Longitud, ContactoRepuestos, IdPlanta) VALUES (1,'Nave','Hall','L1',NULL,NULL,'x@y.es',1);"
        );
    }

    #[test]
    fn test_ordenes() {
        let script = "INSERT INTO `ordenes` VALUES \
                      (7,'4001','2023-01-02 10:00:00','2023-01-02 11:00:00','Ruido, fuerte',NULL,NULL,30,1,12,2,3,1,'Junta',NULL),\
                      (8,NULL,'2023-01-03','2023-01-03',NULL,NULL,NULL,NULL,0,12,1,NULL,1,NULL,'2023-02-01');";
        let out = transformer().apply(Table::Ordenes, script).unwrap();
        let rows = rows_of(&out);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].values,
            vec![
                SqlValue::bare("7"),
                SqlValue::quoted_raw("4001"),
                SqlValue::quoted_raw("2023-01-02 10:00:00"),
                SqlValue::quoted_raw("2023-01-02 11:00:00"),
                SqlValue::quoted_raw("Ruido, fuerte"),
                SqlValue::Null,
                SqlValue::Null,
                SqlValue::quoted_raw("30"),
                SqlValue::bare("1"),
                SqlValue::bare("12"),
                SqlValue::bare("2"),
                SqlValue::quoted_raw("bf368d2b-7199-47ad-8524-3f3db3e9461a"),
                SqlValue::bare("1"),
                SqlValue::quoted_raw("Junta"),
            ]
        );
        assert_eq!(rows[1].len(), schema::ORDENES.arity());
        assert_eq!(
            rows[1].values[11],
            SqlValue::quoted_raw("eedc8529-76e8-4dfc-93c8-1dd0dbfa85d1")
        );
    }

    #[test]
    fn test_ordenes_creator_14_is_missing() {
        let script = "INSERT INTO `ordenes` VALUES (1,NULL,NULL,NULL,NULL,NULL,NULL,NULL,0,1,1,14,1,NULL,NULL);";
        let err = transformer().apply(Table::Ordenes, script).unwrap_err();
        assert_eq!(err.to_string(), "No entry for '14' in lookup table 'creators'");
    }

    #[test]
    fn test_incidencias_ordenes() {
        let script = "LOCK TABLES `orden_incidencias_resolucion` WRITE;\n\
                      INSERT INTO `orden_incidencias_resolucion` VALUES (55,'2023-05-01 08:00:00',7,3,4,NULL,NULL,9,1,0,1);\n\
                      UNLOCK TABLES;";
        let out = transformer().apply(Table::IncidenciasOrdenes, script).unwrap();
        assert_eq!(
            out,
            "LOCK TABLES `incidenciasordenes` WRITE;\n\
             INSERT INTO `incidenciasordenes` (FechaDeteccion, IdOrden, IdComponente, IdIncidencia, \
             IdResolucion, FechaResolucion, ParoMaquina, CambioPieza, AfectaProduccion) \
             VALUES ('2023-05-01 08:00:00',7,3,4,NULL,NULL,1,0,1);\n\
             UNLOCK TABLES;"
        );
    }

    #[test]
    fn test_usuarios_ordenes() {
        let script = "LOCK TABLES `usuarios_orden` WRITE;\n\
                      INSERT INTO `usuarios_orden` VALUES (14,100),(1,101);\n\
                      UNLOCK TABLES;";
        let out = transformer().apply(Table::UsuariosOrdenes, script).unwrap();
        assert_eq!(
            out,
            "LOCK TABLES `usuarios_ordenes` WRITE;\n\
             INSERT INTO `usuarios_ordenes` (IdUsuario, IdOrden) VALUES \
             ('a7fac1e5-c319-433a-acbc-52dfa8fc2829',100),('81e47e59-a3d5-4c7b-b3f7-077da98a369f',101);\n\
             UNLOCK TABLES;"
        );
    }

    #[test]
    fn test_historial_keeps_null_users() {
        let script = "INSERT INTO `historial_modificaciones_usuarios_ordenes` VALUES (1,'2023-06-01',100,NULL,5);";
        let out = transformer().apply(Table::HistorialUsuariosOrdenes, script).unwrap();
        let row = &rows_of(&out)[0];
        assert_eq!(row.values[3], SqlValue::Null);
        assert_eq!(
            row.values[4],
            SqlValue::quoted_raw("b63bc715-6fb6-4121-8877-9ccc477614b3")
        );
        assert!(out.starts_with("INSERT INTO `historialcambiosusuariosordenes` (Id, FechaCambio,"));
    }

    #[test]
    fn test_tuple_count_preserved() {
        let script = "INSERT INTO `usuarios_orden` VALUES (1,1),(2,2),(3,3),(4,4),(5,5);";
        let out = transformer().apply(Table::UsuariosOrdenes, script).unwrap();
        assert_eq!(rows_of(&out).len(), rows_of(script).len());
    }

    #[test]
    fn test_wrong_arity_is_error() {
        let script = "INSERT INTO `centrosdecostes` VALUES (1,'CC01','M');";
        let err = transformer().apply(Table::CentrosCostes, script).unwrap_err();
        assert!(matches!(err, MigrateError::Arity { expected: 5, found: 3, .. }));
    }

    #[test]
    fn test_table_lookup() {
        assert_eq!(Table::for_file("hitachi_activos.sql"), Some(Table::Activos));
        assert_eq!(Table::for_file("hitachi_empresas.sql"), None);
        assert_eq!("Activos".parse::<Table>().unwrap(), Table::Activos);
        assert!("nope".parse::<Table>().is_err());
        for table in Table::ALL {
            assert_eq!(table.name().parse::<Table>().unwrap(), table);
        }
    }
}

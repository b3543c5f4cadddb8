//! Table catalogue: legacy row layouts and target column lists.
//!
//! Transforms never index into a row by position. A row tuple is bound to
//! the [`Layout`] of its legacy table, producing a [`Record`] whose fields
//! are taken by name.

use crate::ast::{RowTuple, SqlValue};
use crate::error::{MigrateError, MigrateResult};

/// A table in the new schema with its explicit column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetTable {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl TargetTable {
    pub fn arity(&self) -> usize {
        self.columns.len()
    }
}

/// Field names of a legacy table, in dump order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub table: &'static str,
    pub fields: &'static [&'static str],
}

impl Layout {
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Bind a row tuple to this layout.
    pub fn bind(&self, row: RowTuple) -> MigrateResult<Record> {
        if row.len() != self.arity() {
            return Err(MigrateError::Arity {
                table: self.table,
                expected: self.arity(),
                found: row.len(),
            });
        }
        Ok(Record {
            table: self.table,
            fields: self
                .fields
                .iter()
                .copied()
                .zip(row.values.into_iter().map(Some))
                .collect(),
        })
    }
}

/// A legacy row with named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    table: &'static str,
    fields: Vec<(&'static str, Option<SqlValue>)>,
}

impl Record {
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Move a field out of the record.
    pub fn take(&mut self, field: &'static str) -> MigrateResult<SqlValue> {
        self.fields
            .iter_mut()
            .find(|(name, _)| *name == field)
            .and_then(|(_, value)| value.take())
            .ok_or(MigrateError::UnknownField {
                table: self.table,
                field,
            })
    }

    /// Borrow a field without consuming it.
    pub fn get(&self, field: &'static str) -> MigrateResult<&SqlValue> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .and_then(|(_, value)| value.as_ref())
            .ok_or(MigrateError::UnknownField {
                table: self.table,
                field,
            })
    }
}

// --- Column injection targets ---------------------------------------------

pub const PLANTAS: TargetTable = TargetTable {
    name: "plantas",
    columns: &["Id", "Descripcion", "StmpConfig", "Latitud", "Longitud", "IdEmpresa"],
};

pub const COMPONENTES: TargetTable = TargetTable {
    name: "componentes",
    columns: &["Id", "Denominacion", "DescripcionES", "DescripcionEN", "IdComponentePadre"],
};

pub const INCIDENCIAS: TargetTable = TargetTable {
    name: "incidencias",
    columns: &["Id", "DescripcionES", "DescripcionEN", "IdMecanismoFallo"],
};

pub const RESOLUCIONES: TargetTable = TargetTable {
    name: "resoluciones",
    columns: &["Id", "DescripcionES", "DescripcionEN"],
};

pub const MECANISMOS_DE_FALLO: TargetTable = TargetTable {
    name: "mecanismosdefallo",
    columns: &["Id", "DescripcionES", "DescripcionEN"],
};

// --- Identifier renames ---------------------------------------------------

pub const ESTADOS_ORDEN: &str = "estadosorden";
pub const TIPOS_ORDEN: &str = "tiposorden";

// --- Row restructuring ----------------------------------------------------

pub const CENTROS_COSTES: TargetTable = TargetTable {
    name: "centrosdecostes",
    columns: &["Id", "DescripcionES", "DescripcionEN", "CentroCosteSAP", "IdPlanta"],
};

pub const CENTROS_COSTES_LEGACY: Layout = Layout {
    table: "centrosdecostes",
    fields: &["id", "centro_coste_sap", "descripcion_es", "descripcion_en", "planta"],
};

pub const LOCALIZACIONES: TargetTable = TargetTable {
    name: "localizaciones",
    columns: &[
        "Id",
        "DescripcionES",
        "DescripcionEN",
        "LocalizacionSAP",
        "Latitud",
        "Longitud",
        "ContactoRepuestos",
        "IdPlanta",
    ],
};

pub const LOCALIZACIONES_LEGACY: Layout = Layout {
    table: "localizaciones",
    fields: &[
        "id",
        "descripcion_es",
        "descripcion_en",
        "localizacion_sap",
        "latitud",
        "longitud",
        "contacto_repuestos",
        "planta",
    ],
};

pub const ACTIVOS: TargetTable = TargetTable {
    name: "activos",
    columns: &[
        "Id",
        "ActivoSAP",
        "DescripcionES",
        "DescripcionEN",
        "Redundancia",
        "Hse",
        "Usabilidad",
        "Coste",
        "ValorCriticidad",
        "IdCriticidad",
        "IdLocalizacion",
        "IdCentroCoste",
        "IdEstadoActivo",
    ],
};

pub const ACTIVOS_LEGACY: Layout = Layout {
    table: "activos",
    fields: &[
        "id",
        "activo_sap",
        "descripcion_es",
        "descripcion_en",
        "redundancia",
        "hse",
        "usabilidad",
        "coste",
        "valor_criticidad",
        "criticidad",
        "localizacion",
        "centro_coste",
        "nivel_maximo",
        "actividad",
    ],
};

pub const ORDENES: TargetTable = TargetTable {
    name: "ordenes",
    columns: &[
        "Id",
        "IdSAP",
        "FechaCreacion",
        "FechaApertura",
        "ComentarioOrden",
        "FechaCierre",
        "ComentarioResolucion",
        "TiempoParada",
        "Confirmada",
        "IdActivo",
        "IdEstadoOrden",
        "IdUsuarioCreador",
        "IdTipoOrden",
        "Materiales",
    ],
};

pub const ORDENES_LEGACY: Layout = Layout {
    table: "ordenes",
    fields: &[
        "id",
        "id_sap",
        "fecha_creacion",
        "fecha_apertura",
        "comentario_orden",
        "fecha_cierre",
        "comentario_resolucion",
        "tiempo_parada",
        "confirmada",
        "activo",
        "estado",
        "creador",
        "tipo_orden",
        "materiales",
        "fecha_anulacion",
    ],
};

pub const INCIDENCIAS_ORDENES: TargetTable = TargetTable {
    name: "incidenciasordenes",
    columns: &[
        "FechaDeteccion",
        "IdOrden",
        "IdComponente",
        "IdIncidencia",
        "IdResolucion",
        "FechaResolucion",
        "ParoMaquina",
        "CambioPieza",
        "AfectaProduccion",
    ],
};

pub const INCIDENCIAS_ORDENES_LEGACY: Layout = Layout {
    table: "orden_incidencias_resolucion",
    fields: &[
        "id",
        "fecha_deteccion",
        "orden",
        "componente",
        "incidencia",
        "resolucion",
        "fecha_resolucion",
        "repuesto",
        "paro_maquina",
        "cambio_pieza",
        "afecta_produccion",
    ],
};

pub const USUARIOS_ORDENES: TargetTable = TargetTable {
    name: "usuarios_ordenes",
    columns: &["IdUsuario", "IdOrden"],
};

pub const USUARIOS_ORDENES_LEGACY: Layout = Layout {
    table: "usuarios_orden",
    fields: &["usuario", "orden"],
};

pub const HISTORIAL_USUARIOS_ORDENES: TargetTable = TargetTable {
    name: "historialcambiosusuariosordenes",
    columns: &["Id", "FechaCambio", "IdOrden", "IdUsuarioOrigen", "IdUsuarioDestino"],
};

pub const HISTORIAL_USUARIOS_ORDENES_LEGACY: Layout = Layout {
    table: "historial_modificaciones_usuarios_ordenes",
    fields: &["id", "fecha_cambio", "orden", "usuario_origen", "usuario_destino"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_arities() {
        assert_eq!(PLANTAS.arity(), 6);
        assert_eq!(COMPONENTES.arity(), 5);
        assert_eq!(INCIDENCIAS.arity(), 4);
        assert_eq!(RESOLUCIONES.arity(), 3);
        assert_eq!(MECANISMOS_DE_FALLO.arity(), 3);
        assert_eq!(CENTROS_COSTES.arity(), CENTROS_COSTES_LEGACY.arity());
        assert_eq!(LOCALIZACIONES.arity(), LOCALIZACIONES_LEGACY.arity());
        assert_eq!(ACTIVOS.arity() + 1, ACTIVOS_LEGACY.arity());
        assert_eq!(ORDENES.arity() + 1, ORDENES_LEGACY.arity());
        assert_eq!(INCIDENCIAS_ORDENES.arity() + 2, INCIDENCIAS_ORDENES_LEGACY.arity());
    }

    #[test]
    fn test_bind_checks_arity() {
        let row = RowTuple::new(vec![SqlValue::bare("1")]);
        let err = USUARIOS_ORDENES_LEGACY.bind(row).unwrap_err();
        assert_eq!(err.to_string(), "Row in 'usuarios_orden' has 1 values, expected 2");
    }

    #[test]
    fn test_take_consumes_field() {
        let row = RowTuple::new(vec![SqlValue::bare("3"), SqlValue::bare("40")]);
        let mut record = USUARIOS_ORDENES_LEGACY.bind(row).unwrap();
        assert_eq!(record.get("orden").unwrap(), &SqlValue::bare("40"));
        assert_eq!(record.take("usuario").unwrap(), SqlValue::bare("3"));
        assert!(record.take("usuario").is_err());
        assert!(record.take("missing").is_err());
    }
}

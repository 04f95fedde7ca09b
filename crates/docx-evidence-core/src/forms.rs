//! Form payloads and their mapping onto template placeholders.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DocxError, Result};
use crate::placeholders::Placeholders;

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Long Spanish date, e.g. `16 de octubre de 2026`.
pub fn long_date_es(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS_ES[date.month0() as usize],
        date.year()
    )
}

/// Timestamp used in generated file names: `2026-10-16T09-30-00`.
pub fn file_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// Replace characters that cannot appear in a single path component.
fn file_component(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect()
}

/// QA test-evidence metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvidenceForm {
    pub ciclo_sprint: String,
    #[serde(rename = "analistaQA")]
    pub analista_qa: String,
    pub caso_prueba: String,
    pub proyecto_equipo: String,
    pub fecha_ejecucion: Option<NaiveDate>,
    pub estado: String,
}

impl EvidenceForm {
    pub const KEYS: [&'static str; 6] = ["CICLO", "ANALISTA", "CASOPRUEBA", "PROYECTO", "FECHA", "ESTADO"];

    /// Every field is required before a document is generated.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        let text_fields = [
            ("CICLO", &self.ciclo_sprint),
            ("ANALISTA", &self.analista_qa),
            ("CASOPRUEBA", &self.caso_prueba),
            ("PROYECTO", &self.proyecto_equipo),
            ("ESTADO", &self.estado),
        ];
        for (key, value) in text_fields {
            if value.trim().is_empty() {
                missing.push(key);
            }
        }
        if self.fecha_ejecucion.is_none() {
            missing.push("FECHA");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DocxError::IncompleteForm(missing))
        }
    }

    pub fn placeholders(&self) -> Placeholders {
        let fecha = self.fecha_ejecucion.map(long_date_es).unwrap_or_default();
        [
            ("CICLO", self.ciclo_sprint.clone()),
            ("ANALISTA", self.analista_qa.clone()),
            ("CASOPRUEBA", self.caso_prueba.clone()),
            ("PROYECTO", self.proyecto_equipo.clone()),
            ("FECHA", fecha),
            ("ESTADO", self.estado.clone()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// `Evidencia_<caso>_<timestamp>.docx`
    pub fn file_name(&self, now: DateTime<Utc>) -> String {
        format!(
            "Evidencia_{}_{}.docx",
            file_component(&self.caso_prueba),
            file_timestamp(now)
        )
    }
}

/// Requirement-request metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequirementForm {
    pub id: String,
    pub fecha: String,
    pub area: String,
    pub contacto: String,
    pub info: String,
    pub descripcion: String,
    pub objetivo: String,
    pub beneficio: String,
    pub funcionales: String,
    pub no_funcionales: String,
    pub criterios: String,
    pub tipo_nuevo: bool,
    pub tipo_mejora: bool,
    pub tipo_correccion: bool,
    pub tipo_otro: bool,
}

impl RequirementForm {
    /// Label of the first checked request type, or empty when none is.
    pub fn tipo_req(&self) -> &'static str {
        if self.tipo_nuevo {
            "Nuevo producto"
        } else if self.tipo_mejora {
            "Mejora"
        } else if self.tipo_correccion {
            "Corrección"
        } else if self.tipo_otro {
            "Otro"
        } else {
            ""
        }
    }

    pub fn placeholders(&self) -> Placeholders {
        [
            ("ID", self.id.clone()),
            ("FECHA", self.fecha.clone()),
            ("CARGO", self.area.clone()),
            ("CONTACTO", self.contacto.clone()),
            ("NOMBRE_REQ", self.info.clone()),
            ("DESCRIPCION", self.descripcion.clone()),
            ("OBJETIVO", self.objetivo.clone()),
            ("BENEFICIO", self.beneficio.clone()),
            ("FUNCIONALES", self.funcionales.clone()),
            ("NO_FUNCIONALES", self.no_funcionales.clone()),
            ("CA", self.criterios.clone()),
            ("TIPO_REQ", self.tipo_req().to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// `Solicitud_Requerimiento_<ID>_<FECHA>.docx`, with literal `ID` /
    /// `FECHA` standing in for empty fields.
    pub fn file_name(&self) -> String {
        let or = |value: &str, fallback: &str| {
            if value.is_empty() {
                fallback.to_string()
            } else {
                file_component(value)
            }
        };
        format!(
            "Solicitud_Requerimiento_{}_{}.docx",
            or(&self.id, "ID"),
            or(&self.fecha, "FECHA")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn evidence() -> EvidenceForm {
        EvidenceForm {
            ciclo_sprint: "Sprint 12".to_string(),
            analista_qa: "Lucía Pérez".to_string(),
            caso_prueba: "CP-104".to_string(),
            proyecto_equipo: "Pagos".to_string(),
            fecha_ejecucion: NaiveDate::from_ymd_opt(2026, 10, 16),
            estado: "Aprobado".to_string(),
        }
    }

    #[test]
    fn test_long_date_es() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(long_date_es(date), "5 de enero de 2026");
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(long_date_es(date), "31 de diciembre de 2026");
    }

    #[test]
    fn test_evidence_placeholders_cover_all_keys() {
        let values = evidence().placeholders();
        let keys: Vec<&str> = values.keys().map(String::as_str).collect();
        let mut expected = EvidenceForm::KEYS.to_vec();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(values["FECHA"], "16 de octubre de 2026");
        assert_eq!(values["ANALISTA"], "Lucía Pérez");
    }

    #[test]
    fn test_evidence_validation() {
        assert!(evidence().validate().is_ok());

        let form = EvidenceForm {
            estado: "  ".to_string(),
            fecha_ejecucion: None,
            ..evidence()
        };
        match form.validate().unwrap_err() {
            DocxError::IncompleteForm(fields) => assert_eq!(fields, vec!["ESTADO", "FECHA"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_evidence_file_name() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 5, 7).unwrap();
        assert_eq!(
            evidence().file_name(now),
            "Evidencia_CP-104_2026-10-16T09-05-07.docx"
        );

        let form = EvidenceForm {
            caso_prueba: "CP/7".to_string(),
            ..evidence()
        };
        assert_eq!(form.file_name(now), "Evidencia_CP-7_2026-10-16T09-05-07.docx");
    }

    #[test]
    fn test_evidence_from_json() {
        let json = r#"{
            "cicloSprint": "Sprint 3",
            "analistaQA": "Tomás",
            "casoPrueba": "CP-1",
            "proyectoEquipo": "Core",
            "fechaEjecucion": "2026-03-02",
            "estado": "Fallido"
        }"#;
        let form: EvidenceForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.analista_qa, "Tomás");
        assert_eq!(form.placeholders()["FECHA"], "2 de marzo de 2026");
    }

    #[test]
    fn test_tipo_req_priority() {
        let form = RequirementForm {
            tipo_mejora: true,
            tipo_otro: true,
            ..Default::default()
        };
        assert_eq!(form.tipo_req(), "Mejora");
        assert_eq!(RequirementForm::default().tipo_req(), "");

        let form = RequirementForm {
            tipo_correccion: true,
            ..Default::default()
        };
        assert_eq!(form.placeholders()["TIPO_REQ"], "Corrección");
    }

    #[test]
    fn test_requirement_placeholders_map_form_fields() {
        let form: RequirementForm = serde_json::from_str(
            r#"{"id": "REQ-77", "area": "Riesgos", "info": "Alta de clientes",
                "noFuncionales": "Latencia < 200ms", "criterios": "Dado..."}"#,
        )
        .unwrap();
        let values = form.placeholders();
        assert_eq!(values.len(), 12);
        assert_eq!(values["CARGO"], "Riesgos");
        assert_eq!(values["NOMBRE_REQ"], "Alta de clientes");
        assert_eq!(values["NO_FUNCIONALES"], "Latencia < 200ms");
        assert_eq!(values["CA"], "Dado...");
        assert_eq!(values["FECHA"], "");
    }

    #[test]
    fn test_requirement_file_name() {
        assert_eq!(
            RequirementForm::default().file_name(),
            "Solicitud_Requerimiento_ID_FECHA.docx"
        );
        let form = RequirementForm {
            id: "REQ-9".to_string(),
            fecha: "2026-10-16".to_string(),
            ..Default::default()
        };
        assert_eq!(form.file_name(), "Solicitud_Requerimiento_REQ-9_2026-10-16.docx");
    }
}

//! Builds the downloadable correction document.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::export::font_metrics::{default_page_config, HELVETICA};

pub const DOCUMENT_HEADER: &str = "Avaliação da Redação - ENEM";
const FILENAME_MAX_CHARS: usize = 50;
const FILE_EXTENSION: &str = "txt";

/// Markers shown while no correction has arrived yet.
const PLACEHOLDER_MARKERS: &[&str] = &["Aguardando", "aguarde"];

/// What the client is currently displaying, plus optional class metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub resultado: String,
    #[serde(default)]
    pub tema: String,
    pub aluno: Option<String>,
    pub turma: Option<String>,
}

impl ExportRequest {
    /// Student and class, only when both are present and non-blank.
    fn student_and_class(&self) -> Option<(&str, &str)> {
        let aluno = self.aluno.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let turma = self.turma.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((aluno, turma))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub filename: String,
    pub metadata: String,
    pub body: Vec<String>,
}

impl ExportDocument {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(DOCUMENT_HEADER);
        out.push('\n');
        out.push_str(&self.metadata);
        out.push_str("\n\n");
        for line in &self.body {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Produces the export document, or refuses when there is nothing real to export.
pub fn export_report(request: &ExportRequest, date: NaiveDate) -> Result<ExportDocument, AppError> {
    let text = request.resultado.trim();
    if text.is_empty() || PLACEHOLDER_MARKERS.iter().any(|m| text.contains(m)) {
        return Err(AppError::NothingToExport);
    }

    let tema = request.tema.trim();
    let mut metadata = format!("Data: {} | Tema: {tema}", date.format("%d/%m/%Y"));
    let stem = match request.student_and_class() {
        Some((aluno, turma)) => {
            metadata = format!("Aluno: {aluno} | Turma: {turma} | {metadata}");
            format!("Correcao_{aluno}_{turma}")
        }
        None => format!("Correcao_{tema}"),
    };

    Ok(ExportDocument {
        filename: format!("{}.{FILE_EXTENSION}", sanitize_filename(&stem)),
        metadata,
        body: HELVETICA.wrap(text, &default_page_config()),
    })
}

/// Replaces every character outside `[A-Za-z0-9]` with `_` and caps the length.
pub fn sanitize_filename(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(FILENAME_MAX_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 3).unwrap()
    }

    fn request(resultado: &str) -> ExportRequest {
        ExportRequest {
            resultado: resultado.to_string(),
            tema: "Mobilidade urbana".to_string(),
            aluno: None,
            turma: None,
        }
    }

    #[test]
    fn test_sanitize_filename_replaces_non_alphanumerics() {
        let name = sanitize_filename("João's Essay!");
        assert_eq!(name, "Jo_o_s_Essay_");
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_sanitize_filename_caps_length() {
        let name = sanitize_filename(&"redação ".repeat(20));
        assert_eq!(name.chars().count(), 50);
    }

    #[test]
    fn test_refuses_empty_result() {
        assert!(matches!(
            export_report(&request("   \n "), date()),
            Err(AppError::NothingToExport)
        ));
    }

    #[test]
    fn test_refuses_placeholder() {
        assert!(matches!(
            export_report(&request("Aguardando correção..."), date()),
            Err(AppError::NothingToExport)
        ));
        assert!(matches!(
            export_report(&request("Corrigindo, aguarde"), date()),
            Err(AppError::NothingToExport)
        ));
    }

    #[test]
    fn test_topic_only_metadata_and_filename() {
        let doc = export_report(&request("Nota Final: 880/1000"), date()).unwrap();
        assert_eq!(doc.metadata, "Data: 03/11/2024 | Tema: Mobilidade urbana");
        assert_eq!(doc.filename, "Correcao_Mobilidade_urbana.txt");
        assert_eq!(doc.body, vec!["Nota Final: 880/1000".to_string()]);
    }

    #[test]
    fn test_student_and_class_take_precedence() {
        let mut req = request("Nota Final: 880/1000");
        req.aluno = Some("Ana Lúcia".to_string());
        req.turma = Some("3º B".to_string());
        let doc = export_report(&req, date()).unwrap();
        assert_eq!(
            doc.metadata,
            "Aluno: Ana Lúcia | Turma: 3º B | Data: 03/11/2024 | Tema: Mobilidade urbana"
        );
        assert_eq!(doc.filename, "Correcao_Ana_L_cia_3__B.txt");
    }

    #[test]
    fn test_student_without_class_falls_back_to_topic() {
        let mut req = request("Nota Final: 880/1000");
        req.aluno = Some("Ana".to_string());
        req.turma = Some("  ".to_string());
        let doc = export_report(&req, date()).unwrap();
        assert_eq!(doc.filename, "Correcao_Mobilidade_urbana.txt");
        assert!(!doc.metadata.contains("Aluno"));
    }

    #[test]
    fn test_render_layout() {
        let doc = export_report(&request("linha um\n\nlinha dois"), date()).unwrap();
        assert_eq!(
            doc.render(),
            "Avaliação da Redação - ENEM\n\
             Data: 03/11/2024 | Tema: Mobilidade urbana\n\n\
             linha um\n\nlinha dois\n"
        );
    }
}

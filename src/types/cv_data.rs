// src/types/cv_data.rs
//! Parsed CV summary as persisted by the backend once processing completes

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvSummary {
    pub id: i64,
    #[serde(rename = "fichierPath")]
    pub file_path: Option<String>,
    #[serde(rename = "nom")]
    pub last_name: Option<String>,
    #[serde(rename = "prenom")]
    pub first_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
    #[serde(rename = "adresse")]
    pub address: Option<String>,
    pub linkedin_url: Option<String>,
    #[serde(rename = "competencesTechniques")]
    pub technical_skills: Option<String>,
    #[serde(rename = "competencesTransversales")]
    pub soft_skills: Option<String>,
    #[serde(rename = "experienceAnnees")]
    pub experience_years: Option<u32>,
    #[serde(rename = "niveauEtude")]
    pub education_level: Option<String>,
    #[serde(rename = "langues")]
    pub languages: Option<String>,
    #[serde(rename = "formations")]
    pub trainings: Option<String>,
    pub certifications: Option<String>,
    #[serde(rename = "projets")]
    pub projects: Option<String>,
    #[serde(rename = "pointsForts")]
    pub strengths: Option<String>,
    #[serde(rename = "resumeProfessionnel")]
    pub professional_summary: Option<String>,
    #[serde(rename = "motsClesGeneres")]
    pub keywords: Option<String>,
    #[serde(rename = "dateCreation")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "dateModification")]
    pub updated_at: Option<NaiveDateTime>,
    pub embedding_generated: Option<bool>,
    pub embedding_size: Option<u32>,
}

impl CvSummary {
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Technical skills split from the comma separated list the extractor stores
    pub fn technical_skill_list(&self) -> Vec<String> {
        split_list(self.technical_skills.as_deref())
    }

    pub fn keyword_list(&self) -> Vec<String> {
        split_list(self.keywords.as_deref())
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

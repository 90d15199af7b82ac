use crate::errors::RoofdeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn from_content_type(content_type: &str) -> Result<Self, RoofdeskError> {
        let essence = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::Webp),
            other => Err(RoofdeskError::BadRequest(format!("Unsupported image type '{other}'"))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

fn segment(value: &str) -> Result<&str, RoofdeskError> {
    let ok = !value.is_empty()
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(value)
    } else {
        Err(RoofdeskError::BadRequest(format!("Invalid key segment '{value}'")))
    }
}

pub fn issue_image_key(branch_id: &str, report_id: &str, issue_id: &str, kind: ImageKind) -> Result<String, RoofdeskError> {
    Ok(format!(
        "branches/{}/reports/{}/issues/{}/{}.{}",
        segment(branch_id)?,
        segment(report_id)?,
        segment(issue_id)?,
        uuid::Uuid::new_v4(),
        kind.extension()
    ))
}

pub fn snapshot_key(branch_id: &str, report_id: &str, kind: ImageKind) -> Result<String, RoofdeskError> {
    Ok(format!(
        "branches/{}/reports/{}/snapshots/{}.{}",
        segment(branch_id)?,
        segment(report_id)?,
        uuid::Uuid::new_v4(),
        kind.extension()
    ))
}

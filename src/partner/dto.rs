//! Wire shapes of the legacy partner system. Field names on the wire are
//! Portuguese; pricing sits at the bottom of a shift → admission form →
//! payment type → payment option chain, every level a list and frequently
//! missing. None of these types escape the transformer layer.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerUnit {
    #[serde(rename = "codigo")]
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "uf")]
    pub state: String,
    #[serde(rename = "cidade")]
    pub city: String,
}

/// One flat row per course × modality × shift × admission form × payment
/// type × price tier, as the courses-by-unit endpoint returns them.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerRow {
    #[serde(rename = "codigoCurso")]
    pub course_code: i64,
    #[serde(rename = "nomeCurso")]
    pub course_name: String,
    #[serde(rename = "nivelEnsino", default)]
    pub level: Option<String>,
    #[serde(rename = "modalidade", default)]
    pub modality: Option<String>,
    #[serde(rename = "turno", default)]
    pub shift: Option<String>,
    #[serde(rename = "duracaoMeses", default)]
    pub duration_months: Option<u32>,
    /// BRL string, e.g. "1.234,56".
    #[serde(rename = "valorMensalidade", default)]
    pub monthly_price: Option<String>,
    #[serde(rename = "formaIngresso", default)]
    pub admission_form: Option<String>,
    #[serde(rename = "tipoPagamento", default)]
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerCourseDetail {
    #[serde(rename = "codigoCurso")]
    pub course_code: i64,
    #[serde(rename = "nomeCurso")]
    pub course_name: String,
    #[serde(rename = "nivelEnsino", default)]
    pub level: Option<String>,
    #[serde(rename = "modalidade", default)]
    pub modality: Option<String>,
    #[serde(rename = "duracaoMeses", default)]
    pub duration_months: Option<u32>,
    #[serde(rename = "turnos", default)]
    pub shifts: Vec<PartnerShift>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerShift {
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "formasIngresso", default)]
    pub admission_forms: Vec<PartnerAdmissionForm>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerAdmissionForm {
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "tiposPagamento", default)]
    pub payment_types: Vec<PartnerPaymentType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerPaymentType {
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "opcoesPagamento", default)]
    pub payment_options: Vec<PartnerPaymentOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerPaymentOption {
    #[serde(rename = "valorMensalidade", default)]
    pub monthly_price: Option<String>,
    #[serde(rename = "parcelas", default)]
    pub installments: Option<u32>,
}

//! # Operation Catalog
//!
//! Known PDF4me endpoints with the result kind each returns and the file
//! extension its output usually carries.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::job::ResultKind;

/// Path prefix every PDF4me operation lives under
pub const API_PREFIX: &str = "/api/v2/";

/// Endpoint path for an operation name (`Merge` → `/api/v2/Merge`).
///
/// Names that already look like a path or URL are returned unchanged.
pub fn endpoint_for(name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{API_PREFIX}{name}")
    }
}

macro_rules! operations {
    ($($variant:ident => $path:literal, $kind:ident, $ext:expr;)+) => {
        /// A PDF4me operation
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($variant,)+
        }

        impl Operation {
            /// Every cataloged operation
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)+];

            /// Endpoint name as it appears after `/api/v2/`
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $path,)+
                }
            }

            /// How a `200` body is decoded
            pub fn result_kind(&self) -> ResultKind {
                match self {
                    $(Self::$variant => ResultKind::$kind,)+
                }
            }

            /// Usual output extension; `None` keeps the input's extension
            pub fn output_extension(&self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => $ext,)+
                }
            }
        }
    };
}

operations! {
    AddAttachmentToPdf => "AddAttachmentToPdf", Binary, Some("pdf");
    AddBarcode => "addbarcode", Binary, Some("pdf");
    AddFormField => "AddFormField", Binary, Some("pdf");
    AddHtmlHeaderFooter => "AddHtmlHeaderFooter", Binary, Some("pdf");
    AddImageWatermarkToImage => "AddImageWatermarkToImage", Binary, None;
    AddMargin => "AddMargin", Binary, Some("pdf");
    AddPageNumber => "AddPageNumber", Binary, Some("pdf");
    AddPageNumbers => "AddPageNumbers", Binary, Some("pdf");
    AddTextWatermarkToImage => "AddTextWatermarkToImage", Binary, None;
    ClassifyDocument => "ClassifyDocument", Text, Some("json");
    CompressImage => "CompressImage", Binary, None;
    ConvertHtmlToPdf => "ConvertHtmlToPdf", Binary, Some("pdf");
    ConvertImageFormat => "ConvertImageFormat", Binary, None;
    ConvertJsonToExcel => "ConvertJsonToExcel", Binary, Some("xlsx");
    ConvertMdToPdf => "ConvertMdToPdf", Binary, Some("pdf");
    ConvertOcrPdf => "ConvertOcrPdf", Binary, Some("pdf");
    ConvertPdfToExcel => "ConvertPdfToExcel", Binary, Some("xlsx");
    ConvertPdfToPowerPoint => "ConvertPdfToPowerPoint", Binary, Some("pptx");
    ConvertPdfToWord => "ConvertPdfToWord", Binary, Some("docx");
    ConvertToPdf => "ConvertToPdf", Binary, Some("pdf");
    ConvertUrlToPdf => "ConvertUrlToPdf", Binary, Some("pdf");
    ConvertVisio => "ConvertVisio", Binary, Some("pdf");
    ConvertWordToPdfForm => "ConvertWordToPdfForm", Binary, Some("pdf");
    CreateBarcode => "CreateBarcode", Binary, Some("png");
    CreateImages => "CreateImages", Text, Some("json");
    CreateSwissQrBill => "CreateSwissQrBill", Binary, Some("pdf");
    CropImage => "CropImage", Binary, None;
    DeleteBlankPages => "DeleteBlankPages", Binary, Some("pdf");
    DeletePages => "DeletePages", Binary, Some("pdf");
    DisableTrackingChangesInWord => "DisableTrackingChangesInWord", Binary, Some("docx");
    EnableTrackingChangesInWord => "EnableTrackingChangesInWord", Binary, Some("docx");
    Extract => "Extract", Binary, Some("pdf");
    ExtractAttachmentFromPdf => "ExtractAttachmentFromPdf", Text, Some("json");
    ExtractFormDataFromPdf => "ExtractFormDataFromPdf", Text, Some("json");
    ExtractPdfFormData => "ExtractPdfFormData", Text, Some("json");
    ExtractResources => "ExtractResources", Text, Some("json");
    ExtractTableFromPdf => "ExtractTableFromPdf", Text, Some("json");
    ExtractTextByExpression => "ExtractTextByExpression", Text, Some("json");
    ExtractTextFromWord => "ExtractTextFromWord", Text, Some("json");
    FillPdfForm => "FillPdfForm", Binary, Some("pdf");
    FindAndReplace => "FindAndReplace", Binary, Some("pdf");
    FlattenPdf => "FlattenPdf", Binary, Some("pdf");
    FlipImage => "FlipImage", Binary, None;
    GenerateDocumentMultiple => "GenerateDocumentMultiple", Text, Some("json");
    GenerateDocumentSingle => "GenerateDocumentSingle", Binary, None;
    GetImageMetadata => "GetImageMetadata", Text, Some("json");
    GetPdfMetadata => "GetPdfMetadata", Text, Some("json");
    GetTrackingChangesInWord => "GetTrackingChangesInWord", Text, Some("json");
    ImageExtractText => "ImageExtractText", Text, Some("txt");
    ImageStamp => "ImageStamp", Binary, Some("pdf");
    LinearizePdf => "LinearizePdf", Binary, Some("pdf");
    Merge => "Merge", Binary, Some("pdf");
    MergeOverlay => "MergeOverlay", Binary, Some("pdf");
    Optimize => "Optimize", Binary, Some("pdf");
    ParseDocument => "ParseDocument", Text, Some("json");
    PdfA => "PdfA", Binary, Some("pdf");
    Protect => "Protect", Binary, Some("pdf");
    ReadBarcodes => "ReadBarcodes", Text, Some("json");
    ReadBarcodesFromImage => "ReadBarcodesFromImage", Text, Some("json");
    ReadSwissQrBill => "ReadSwissQRBill", Text, Some("json");
    RemoveExifTagsFromImage => "RemoveEXIFTagsFromImage", Binary, None;
    RepairPdf => "RepairPdf", Binary, Some("pdf");
    ReplaceTextWithImage => "ReplaceTextWithImage", Binary, Some("pdf");
    ReplaceTextWithImageInWord => "ReplaceTextWithImageInWord", Binary, Some("docx");
    ResizeImage => "ResizeImage", Binary, None;
    Rotate => "Rotate", Binary, Some("pdf");
    RotateImage => "RotateImage", Binary, None;
    RotateImageByExifData => "RotateImageByExifData", Binary, None;
    RotatePage => "RotatePage", Binary, Some("pdf");
    SignPdf => "SignPdf", Binary, Some("pdf");
    SplitByText => "SplitByText", Binary, Some("zip");
    SplitPdf => "SplitPdf", Text, Some("json");
    SplitPdfByBarcode => "SplitPdfByBarcode", Text, Some("json");
    Stamp => "Stamp", Binary, Some("pdf");
    Unlock => "Unlock", Binary, Some("pdf");
    UpdateHyperlinkAnnotation => "UpdateHyperlinkAnnotation", Binary, Some("pdf");
}

impl Operation {
    /// Endpoint path relative to the API base URL
    pub fn endpoint(&self) -> String {
        endpoint_for(self.name())
    }

    /// Output file name derived from an input path:
    /// `docs/report.docx` → `report.converttopdf.pdf`
    pub fn default_output_name(&self, input: &Path) -> String {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("output");
        let ext = self
            .output_extension()
            .or_else(|| input.extension().and_then(|e| e.to_str()))
            .unwrap_or("bin");
        format!("{stem}.{}.{ext}", self.name().to_ascii_lowercase())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Operation {
    type Err = String;

    /// Case-insensitive match on the endpoint name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches(API_PREFIX);
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown PDF4me operation: {s}"))
    }
}

//! Document export - flat text, HTML and EPUB assembly
//!
//! Chapter segmentation keys off the literal `"## Chapter "` heading
//! marker. Text with no marker exports as a single undivided chapter
//! rather than failing.

use std::fs;
use std::path::{Path, PathBuf};

use epub_builder::{EpubBuilder, EpubContent, ReferenceType, ZipLibrary};
use thiserror::Error;

pub const CHAPTER_MARKER: &str = "## Chapter ";

pub const TEXT_FILE: &str = "novel.txt";
pub const HTML_FILE: &str = "novel.html";
pub const EPUB_FILE: &str = "novel.epub";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("EPUB assembly failed: {0}")]
    Epub(String),
}

/// One segmented chapter ready for document assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDoc {
    pub title: String,
    pub body: String,
}

/// Paths of the three exported documents.
#[derive(Debug, Clone)]
pub struct ExportArtifacts {
    pub text: PathBuf,
    pub html: PathBuf,
    pub epub: PathBuf,
}

/// Split accumulated narrative text on the chapter heading marker.
///
/// Each segment's first line becomes the chapter title, the remainder
/// its body. Text without any marker becomes one undivided chapter.
pub fn split_chapters(text: &str) -> Vec<ChapterDoc> {
    if !text.contains(CHAPTER_MARKER) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![ChapterDoc {
            title: "Chapter 1".to_string(),
            body: trimmed.to_string(),
        }];
    }

    let mut chapters = Vec::new();
    for segment in text.split(CHAPTER_MARKER) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (head, body) = match segment.split_once('\n') {
            Some((head, body)) => (head.trim(), body.trim()),
            None => (segment, ""),
        };
        chapters.push(ChapterDoc {
            title: format!("Chapter {}", head),
            body: body.to_string(),
        });
    }
    chapters
}

/// Converts the accumulated narrative into the distributable formats.
pub struct DocumentExporter {
    output_dir: PathBuf,
    author: String,
}

impl DocumentExporter {
    pub fn new(output_dir: impl Into<PathBuf>, author: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            author: author.into(),
        }
    }

    /// Write the flat text, HTML and EPUB documents. The cover is
    /// embedded only when the artifact actually exists on disk.
    pub fn export(
        &self,
        full_text: &str,
        title: &str,
        cover: Option<&Path>,
    ) -> Result<ExportArtifacts, ExportError> {
        let chapters = split_chapters(full_text);

        let text = self.write_file(TEXT_FILE, full_text.as_bytes())?;
        let html = self.write_file(HTML_FILE, html_document(title, &chapters).as_bytes())?;
        let epub = self.write_epub(title, &chapters, cover)?;

        tracing::info!(
            "Exported {} chapters to {}, {} and {}",
            chapters.len(),
            text.display(),
            html.display(),
            epub.display()
        );

        Ok(ExportArtifacts { text, html, epub })
    }

    fn write_file(&self, name: &str, contents: &[u8]) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(name);
        fs::write(&path, contents).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn write_epub(
        &self,
        title: &str,
        chapters: &[ChapterDoc],
        cover: Option<&Path>,
    ) -> Result<PathBuf, ExportError> {
        let epub_err = |e: &dyn std::fmt::Display| ExportError::Epub(e.to_string());

        let zip = ZipLibrary::new().map_err(|e| epub_err(&e))?;
        let mut builder = EpubBuilder::new(zip).map_err(|e| epub_err(&e))?;

        builder.metadata("title", title).map_err(|e| epub_err(&e))?;
        builder
            .metadata("author", &self.author)
            .map_err(|e| epub_err(&e))?;
        builder.metadata("lang", "en").map_err(|e| epub_err(&e))?;

        if let Some(cover) = cover {
            if cover.exists() {
                let bytes = fs::read(cover).map_err(|source| ExportError::Io {
                    path: cover.to_path_buf(),
                    source,
                })?;
                builder
                    .add_cover_image("cover.png", bytes.as_slice(), "image/png")
                    .map_err(|e| epub_err(&e))?;
            }
        }

        // Navigation page first, then chapters in order
        builder.inline_toc();

        for (index, chapter) in chapters.iter().enumerate() {
            let xhtml = xhtml_chapter(&chapter.title, &chapter.body);
            let content = EpubContent::new(
                format!("chapter_{}.xhtml", index + 1),
                xhtml.as_bytes(),
            )
            .title(&chapter.title)
            .reftype(ReferenceType::Text);
            builder.add_content(content).map_err(|e| epub_err(&e))?;
        }

        let path = self.output_dir.join(EPUB_FILE);
        let mut out = fs::File::create(&path).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        builder.generate(&mut out).map_err(|e| epub_err(&e))?;
        Ok(path)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Minimal standalone HTML document with line breaks made explicit.
fn html_document(title: &str, chapters: &[ChapterDoc]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n</head>\n<body>\n", escape(title)));
    html.push_str(&format!("<h1>{}</h1>\n", escape(title)));
    for chapter in chapters {
        html.push_str(&format!("<h2>{}</h2>\n", escape(&chapter.title)));
        html.push_str(&format!(
            "<p>{}</p>\n",
            escape(&chapter.body).replace('\n', "<br>")
        ));
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// One XHTML entry for the EPUB container.
fn xhtml_chapter(title: &str, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
         <head><title>{}</title></head>\n\
         <body><h2>{}</h2><p>{}</p></body>\n\
         </html>\n",
        escape(title),
        escape(title),
        escape(body).replace('\n', "<br />")
    )
}

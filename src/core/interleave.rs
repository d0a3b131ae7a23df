use crate::config::InterleaveSection;
use crate::core::fd_reader::RawFdLines;
use crate::core::process::{ensure_success, fork_and_wait};
use crate::core::sink::FdSink;
use crate::core::stream_reader::BufferedLines;
use crate::core::{Demo, LineSource};
use crate::domain::model::{DemoOutcome, InterleaveReport};
use crate::utils::error::Result;
use std::io::Write;
use std::path::PathBuf;

/// How labelled lines are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Separate writes for label, separator and line. A trailing fragment
    /// with no newline is written unlabelled and given one.
    Raw,
    /// One formatted write per line, printed exactly as read.
    Stream,
}

/// Reads up to `n` lines from `source` and writes each as `"<prefix>: <line>"`.
///
/// Returns how many lines were labelled.
pub fn cat_lines<S: LineSource + ?Sized>(
    source: &mut S,
    n: usize,
    prefix: &str,
    out: &mut FdSink,
    style: LineStyle,
) -> Result<usize> {
    let mut printed = 0;
    while printed < n {
        let Some(line) = source.next_line()? else {
            break;
        };

        match style {
            LineStyle::Raw if !line.terminated => {
                out.write_all(&line.bytes)?;
                out.write_all(b"\n")?;
                break;
            }
            LineStyle::Raw => {
                out.write_all(prefix.as_bytes())?;
                out.write_all(b": ")?;
                out.write_all(&line.bytes)?;
            }
            LineStyle::Stream => {
                let mut labelled = Vec::with_capacity(prefix.len() + 2 + line.bytes.len());
                labelled.extend_from_slice(prefix.as_bytes());
                labelled.extend_from_slice(b": ");
                labelled.extend_from_slice(&line.bytes);
                out.write_all(&labelled)?;
            }
        }
        printed += 1;
    }
    Ok(printed)
}

/// Which kind of reader the demo shares across `fork`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKind {
    RawFd,
    Buffered,
}

enum Reader {
    Raw(RawFdLines),
    Buffered(BufferedLines),
}

impl Reader {
    fn source(&mut self) -> &mut dyn LineSource {
        match self {
            Reader::Raw(r) => r,
            Reader::Buffered(r) => r,
        }
    }
}

/// Parent reads a batch, forks, the child reads a batch, then the parent
/// reads another batch once the child is gone.
pub struct InterleaveDemo {
    path: PathBuf,
    kind: ReaderKind,
    settings: InterleaveSection,
}

impl InterleaveDemo {
    pub fn new(path: impl Into<PathBuf>, kind: ReaderKind, settings: InterleaveSection) -> Self {
        Self {
            path: path.into(),
            kind,
            settings,
        }
    }

    fn style(&self) -> LineStyle {
        match self.kind {
            ReaderKind::RawFd => LineStyle::Raw,
            ReaderKind::Buffered => LineStyle::Stream,
        }
    }

    fn open(&self) -> Result<Reader> {
        Ok(match self.kind {
            ReaderKind::RawFd => Reader::Raw(RawFdLines::open(&self.path)?),
            ReaderKind::Buffered => Reader::Buffered(BufferedLines::open(&self.path)?),
        })
    }
}

impl Demo for InterleaveDemo {
    fn name(&self) -> &'static str {
        match self.kind {
            ReaderKind::RawFd => "fd-interleaved",
            ReaderKind::Buffered => "streams-interleaved",
        }
    }

    fn run(&mut self, out: &mut FdSink) -> Result<DemoOutcome> {
        let n = self.settings.lines_per_turn;
        let style = self.style();
        let parent_prefix = self.settings.parent_prefix.as_str();
        let child_prefix = self.settings.child_prefix.as_str();

        tracing::debug!("opening {} with {:?} reader", self.path.display(), self.kind);
        let mut reader = self.open()?;

        let parent_before = cat_lines(reader.source(), n, parent_prefix, out, style)?;
        tracing::debug!("parent read {} lines before fork", parent_before);

        let (pid, child) = fork_and_wait("fork failed", || {
            cat_lines(reader.source(), n, child_prefix, out, style).map(|_| ())
        })?;
        ensure_success(pid, &child)?;

        let parent_after = cat_lines(reader.source(), n, parent_prefix, out, style)?;
        tracing::debug!("parent read {} lines after child {}", parent_after, child);

        Ok(DemoOutcome::Interleave(InterleaveReport {
            parent_before,
            child,
            parent_after,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::tests::fork_guard;
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom};

    fn numbered(count: usize) -> String {
        (1..=count).map(|i| format!("line {}\n", i)).collect()
    }

    fn file_with(contents: &str) -> File {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        file
    }

    fn sink() -> (FdSink, File) {
        let file = tempfile::tempfile().unwrap();
        (FdSink::from_file(file.try_clone().unwrap()), file)
    }

    fn contents(mut file: File) -> String {
        let mut text = String::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_cat_lines_raw_labels_each_line() {
        let mut source = RawFdLines::from_fd(file_with(&numbered(3)).into());
        let (mut out, file) = sink();

        let printed = cat_lines(&mut source, 2, "parent", &mut out, LineStyle::Raw).unwrap();

        assert_eq!(printed, 2);
        assert_eq!(contents(file), "parent: line 1\nparent: line 2\n");
    }

    #[test]
    fn test_cat_lines_raw_fragment_is_unlabelled() {
        let mut source = RawFdLines::from_fd(file_with("a\nb").into());
        let (mut out, file) = sink();

        let printed = cat_lines(&mut source, 5, "parent", &mut out, LineStyle::Raw).unwrap();

        assert_eq!(printed, 1);
        assert_eq!(contents(file), "parent: a\nb\n");
    }

    #[test]
    fn test_cat_lines_stream_keeps_fragment_as_is() {
        let mut source = BufferedLines::new(file_with("a\nb"));
        let (mut out, file) = sink();

        let printed = cat_lines(&mut source, 5, " child", &mut out, LineStyle::Stream).unwrap();

        assert_eq!(printed, 2);
        assert_eq!(contents(file), " child: a\n child: b");
    }

    #[test]
    fn test_cat_lines_stops_at_eof() {
        let mut source = BufferedLines::new(file_with(""));
        let (mut out, file) = sink();

        let printed = cat_lines(&mut source, 5, "parent", &mut out, LineStyle::Stream).unwrap();

        assert_eq!(printed, 0);
        assert_eq!(contents(file), "");
    }

    #[test]
    fn test_raw_demo_child_continues_where_parent_stopped() {
        let _guard = fork_guard();
        let input = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(input.path(), numbered(12)).unwrap();
        let (mut out, file) = sink();

        let mut demo =
            InterleaveDemo::new(input.path(), ReaderKind::RawFd, InterleaveSection::default());
        let outcome = demo.run(&mut out).unwrap();

        let mut expected = String::new();
        for i in 1..=5 {
            expected.push_str(&format!("parent: line {}\n", i));
        }
        for i in 6..=10 {
            expected.push_str(&format!(" child: line {}\n", i));
        }
        for i in 11..=12 {
            expected.push_str(&format!("parent: line {}\n", i));
        }
        assert_eq!(contents(file), expected);

        match outcome {
            DemoOutcome::Interleave(report) => {
                assert_eq!(report.parent_before, 5);
                assert!(report.child.success());
                assert_eq!(report.parent_after, 2);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_buffered_demo_parent_repeats_child_lines() {
        let _guard = fork_guard();
        let input = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(input.path(), numbered(12)).unwrap();
        let (mut out, file) = sink();

        let mut demo =
            InterleaveDemo::new(input.path(), ReaderKind::Buffered, InterleaveSection::default());
        demo.run(&mut out).unwrap();

        let mut expected = String::new();
        for i in 1..=5 {
            expected.push_str(&format!("parent: line {}\n", i));
        }
        for i in 6..=10 {
            expected.push_str(&format!(" child: line {}\n", i));
        }
        for i in 6..=10 {
            expected.push_str(&format!("parent: line {}\n", i));
        }
        assert_eq!(contents(file), expected);
    }
}

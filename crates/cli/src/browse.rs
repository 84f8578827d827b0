use anyhow::{Context, Result};
use scanlog_browser::{ArtifactFileInfo, ArtifactListing, SelectionStore};
use scanlog_reports::ReportEntry;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::render::render_artifacts;
use crate::viewer::Viewer;

const HELP: &str = "commands: ls | open <n|path> | back | download [dir] | quit";

/// Line-oriented artifact session over one execution.
///
/// The listing is recomputed on every `ls`/`open`, so artifacts written while
/// the session is open show up without restarting it.
pub fn run_browse<R: BufRead, W: Write>(
    viewer: &Viewer,
    entry: &ReportEntry,
    input: R,
    out: &mut W,
) -> Result<()> {
    let key = entry.key();
    let folder = entry.extractions_dir();
    let mut selection = SelectionStore::new();

    writeln!(out, "Artifacts of {key} ({})", folder.display())?;
    print_listing(out, &viewer.browser().list_artifacts(&folder))?;
    writeln!(out, "{HELP}")?;

    for line in input.lines() {
        let line = line.context("Failed to read command")?;
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let arg = parts.collect::<Vec<_>>().join(" ");

        let viewing = selection.state(&key).viewing().cloned();
        match (command, viewing) {
            ("quit" | "exit" | "q", _) => break,
            ("ls", None) => {
                print_listing(out, &viewer.browser().list_artifacts(&folder))?;
            }
            ("open", None) => {
                let listing = viewer.browser().list_artifacts(&folder);
                let Some(file) = pick(&listing, &arg) else {
                    writeln!(out, "No artifact '{arg}'.")?;
                    continue;
                };
                let file = file.clone();
                writeln!(out, "Viewing: {}", file.absolute_path.display())?;
                match viewer
                    .browser()
                    .open_for_view(&file, viewer.config().view_limit_bytes)
                {
                    Ok(view) => {
                        writeln!(out, "{}", view.content)?;
                        if view.truncated {
                            writeln!(
                                out,
                                "[view limited to the first {} bytes of {}; use `download` for the full file]",
                                view.shown_bytes, view.total_bytes
                            )?;
                        }
                    }
                    Err(err) => writeln!(out, "Could not open the selected file: {err}")?,
                }
                selection.select(&key, file);
            }
            ("download", Some(file)) => {
                let dir = if arg.is_empty() {
                    PathBuf::from(".")
                } else {
                    PathBuf::from(&arg)
                };
                match save_download(viewer, &file, &dir) {
                    Ok((path, len)) => writeln!(out, "Saved {} ({len} bytes)", path.display())?,
                    Err(err) => writeln!(out, "Could not read the file for download: {err:#}")?,
                }
            }
            ("back", Some(_)) => {
                selection.back(&key);
                print_listing(out, &viewer.browser().list_artifacts(&folder))?;
            }
            _ => writeln!(out, "{HELP}")?,
        }
    }

    Ok(())
}

fn print_listing<W: Write>(out: &mut W, listing: &ArtifactListing) -> Result<()> {
    if listing.is_empty() {
        writeln!(out, "No files found in result/extracoes.")?;
    } else {
        write!(out, "{}", render_artifacts(listing))?;
    }
    for skipped in &listing.skipped {
        writeln!(out, "(skipped: {})", skipped.reason)?;
    }
    Ok(())
}

/// `arg` is either a 1-based row number or a relative path.
fn pick<'a>(listing: &'a ArtifactListing, arg: &str) -> Option<&'a ArtifactFileInfo> {
    if let Ok(row) = arg.parse::<usize>() {
        return row.checked_sub(1).and_then(|idx| listing.files.get(idx));
    }
    listing.get(arg)
}

pub(crate) fn save_download(
    viewer: &Viewer,
    file: &ArtifactFileInfo,
    dir: &Path,
) -> Result<(PathBuf, usize)> {
    let download = viewer.browser().open_for_download(file)?;
    std::fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    let target = dir.join(&download.file_name);
    std::fs::write(&target, &download.bytes)
        .with_context(|| format!("Cannot write {}", target.display()))?;
    Ok((target, download.bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use scanlog_reports::REPORT_RELATIVE_PATH;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn setup(root: &Path) -> (Viewer, ReportEntry) {
        let folder = root.join("modelA/analise-20240101");
        let report = folder.join(REPORT_RELATIVE_PATH);
        fs::create_dir_all(report.parent().unwrap()).unwrap();
        fs::write(report, b"{}").unwrap();
        let extracoes = folder.join("result/extracoes");
        fs::create_dir_all(&extracoes).unwrap();
        fs::write(extracoes.join("a.txt"), b"first artifact").unwrap();
        fs::write(extracoes.join("b.txt"), vec![b'b'; 64]).unwrap();

        let viewer = Viewer::new(ViewerConfig {
            results_dir: root.to_path_buf(),
            view_limit_bytes: 16,
            ..Default::default()
        });
        let catalog = viewer.catalog();
        let entry = viewer.resolve_entry(&catalog, "modelA", None).unwrap();
        (viewer, entry)
    }

    fn session(viewer: &Viewer, entry: &ReportEntry, script: &str) -> String {
        let mut out = Vec::new();
        run_browse(viewer, entry, Cursor::new(script.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn open_view_back_cycle() {
        let temp = tempdir().unwrap();
        let (viewer, entry) = setup(temp.path());

        let out = session(&viewer, &entry, "open 1\nback\nopen b.txt\nquit\n");
        assert!(out.contains("first artifact"));
        assert!(out.contains("[view limited to the first 16 bytes of 64;"));
        assert_eq!(out.matches("| 1 | a.txt |").count(), 2);
    }

    #[test]
    fn commands_outside_their_state_print_help() {
        let temp = tempdir().unwrap();
        let (viewer, entry) = setup(temp.path());

        let out = session(&viewer, &entry, "back\ndownload\nopen 9\n");
        assert_eq!(out.matches(HELP).count(), 3);
        assert!(out.contains("No artifact '9'."));
    }

    #[test]
    fn download_writes_the_full_file() {
        let temp = tempdir().unwrap();
        let (viewer, entry) = setup(temp.path());
        let out_dir = temp.path().join("downloads");

        let script = format!("open b.txt\ndownload {}\n", out_dir.display());
        let out = session(&viewer, &entry, &script);
        assert!(out.contains("(64 bytes)"));
        assert_eq!(fs::read(out_dir.join("b.txt")).unwrap().len(), 64);
    }
}

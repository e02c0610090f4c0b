use metafitch::commands::num_descendants::run;
use std::fs;
use std::io::Read;
use tempfile::TempDir;

#[test]
fn counts_descendants_of_labeled_nodes() {
    let dir = TempDir::new().unwrap();
    let tree = dir.path().join("tree.nwk");
    fs::write(&tree, "(A:1,(B:1,C:0.25)BC:2,(D,E))root;\n").unwrap();
    let output = dir.path().join("counts.tsv");

    run(&tree, &output, None).expect("num-descendants");

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "strain\tnum_descendants\tedge_length\n\
         root\t7\t\n\
         A\t0\t1.0\n\
         BC\t2\t2.0\n\
         B\t0\t1.0\n\
         C\t0\t0.25\n\
         D\t0\t\n\
         E\t0\t\n"
    );
}

#[test]
fn output_is_tab_separated_and_compressed_by_extension() {
    let dir = TempDir::new().unwrap();
    let tree = dir.path().join("tree.nwk");
    fs::write(&tree, "((A,B)X,C)R;").unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "label_column = \"name\"\n").unwrap();
    let output = dir.path().join("counts.csv.gz");

    run(&tree, &output, Some(config.as_path())).expect("num-descendants");

    let (mut reader, format) =
        niffler::get_reader(Box::new(fs::File::open(&output).unwrap())).unwrap();
    assert_eq!(format, niffler::compression::Format::Gzip);
    let mut text = String::new();
    reader.read_to_string(&mut text).unwrap();
    assert_eq!(
        text,
        "name\tnum_descendants\tedge_length\nR\t4\t\nX\t2\t\nA\t0\t\nB\t0\t\nC\t0\t\n"
    );
}

#[test]
fn unreadable_tree_is_fatal() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("counts.tsv");
    let err = run(&dir.path().join("missing.nwk"), &output, None).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read tree"));
    assert!(!output.exists());
}

//! Shared test fixtures
//!
//! Generates a small PKI at test time: a self-signed root, an intermediate issued by the
//! root, a leaf issued by the intermediate and a leaf issued directly by the root.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::{BasicConstraints, KeyUsage};
use openssl::x509::{X509, X509Builder, X509NameBuilder};

use certwrap::x509::Certificate;

pub struct TestPki {
    pub root: X509,
    pub intermediate: X509,
    pub leaf: X509,
    pub direct_leaf: X509,
    pub stranger: X509,
}

impl TestPki {
    pub fn generate() -> Self {
        let root_key = generate_key();
        let root = issue("Test Root CA", &root_key, None, true, 1);

        let intermediate_key = generate_key();
        let intermediate = issue("Test Intermediate CA", &intermediate_key, Some((&root, &root_key)), true, 2);

        let leaf_key = generate_key();
        let leaf = issue("Test Leaf", &leaf_key, Some((&intermediate, &intermediate_key)), false, 3);

        let direct_key = generate_key();
        let direct_leaf = issue("Test Direct Leaf", &direct_key, Some((&root, &root_key)), false, 4);

        let stranger_key = generate_key();
        let stranger = issue("Unrelated Root CA", &stranger_key, None, true, 5);

        Self { root, intermediate, leaf, direct_leaf, stranger }
    }
}

/// Wrap an `openssl` crate certificate in a fresh owning `Certificate`
pub fn wrap(cert: &X509) -> Certificate {
    Certificate::from(cert.clone())
}

/// Write certificates to `dir/name` as a PEM bundle
pub fn write_pem(dir: &Path, name: &str, certs: &[&X509]) -> PathBuf {
    let mut pem = Vec::new();
    for cert in certs {
        pem.extend_from_slice(&cert.to_pem().expect("PEM encoding"));
    }

    let path = dir.join(name);
    fs::write(&path, pem).expect("write PEM file");
    path
}

fn generate_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).expect("P-256 group");
    let ec_key = EcKey::generate(&group).expect("EC key generation");
    PKey::from_ec_key(ec_key).expect("EC key wrapping")
}

fn issue(
    common_name: &str,
    subject_key: &PKey<Private>,
    issuer: Option<(&X509, &PKey<Private>)>,
    ca: bool,
    serial: u32,
) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("O", "certwrap").unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(serial).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    match issuer {
        Some((issuer_cert, _)) => builder.set_issuer_name(issuer_cert.subject_name()).unwrap(),
        None => builder.set_issuer_name(&name).unwrap(),
    }
    builder.set_pubkey(subject_key).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(30).unwrap()).unwrap();

    if ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
        builder
            .append_extension(KeyUsage::new().critical().key_cert_sign().crl_sign().build().unwrap())
            .unwrap();
    }

    let signing_key = issuer.map_or(subject_key, |(_, key)| key);
    builder.sign(signing_key, MessageDigest::sha256()).unwrap();
    builder.build()
}

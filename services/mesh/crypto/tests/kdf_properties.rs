use mesh_crypto::{
    aes_ccm_decrypt, aes_ccm_encrypt, k2, k3, k4, s1, AccessKey, ApplicationKey, NetworkKey, Nonce,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn kdf_is_deterministic(
        secret in any::<[u8; 16]>(),
        salt in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        prop_assert_eq!(s1(&salt), s1(&salt));
        prop_assert_eq!(k2(&secret, &[0x00]), k2(&secret, &[0x00]));
        prop_assert_eq!(k3(&secret), k3(&secret));
        prop_assert_eq!(k4(&secret), k4(&secret));
    }

    #[test]
    fn derived_values_fit_their_width(secret in any::<[u8; 16]>()) {
        prop_assert!(k2(&secret, &[0x00]).nid <= 0x7f);
        prop_assert!(k4(&secret) <= 0x3f);
    }

    #[test]
    fn cached_values_match_fresh_derivation(secret in any::<[u8; 16]>()) {
        let net = NetworkKey::new(secret);
        prop_assert_eq!(net.encryption_keys(), &k2(&secret, &[0x00]));
        prop_assert_eq!(net.network_id(), &k3(&secret));

        let app = ApplicationKey::new(secret);
        prop_assert_eq!(app.aid(), k4(&secret));
    }

    #[test]
    fn ccm_opens_what_it_seals(
        key in any::<[u8; 16]>(),
        seq in 0u32..0x0100_0000,
        payload in proptest::collection::vec(any::<u8>(), 0..380),
        long_mic in any::<bool>(),
    ) {
        let nonce = Nonce::new(0x0001, 0xc000, 5, false).application(seq, 0, long_mic);
        let tag_len = if long_mic { 8 } else { 4 };

        let sealed = aes_ccm_encrypt(&key, &nonce, &payload, &[], tag_len).unwrap();
        prop_assert_eq!(sealed.len(), payload.len() + tag_len);
        prop_assert_eq!(aes_ccm_decrypt(&key, &nonce, &sealed, &[], tag_len).unwrap(), payload);
    }
}

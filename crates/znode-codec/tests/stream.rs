use znode_codec::{ByteStream, Error};

#[test]
fn read_advances_cursor_and_avail_shrinks() {
    let mut stream = ByteStream::from_vec(vec![1, 2, 3, 4]);
    assert_eq!(stream.avail(), 4);
    assert_eq!(stream.read(2).unwrap(), &[1, 2]);
    assert_eq!(stream.tell(), 2);
    assert_eq!(stream.avail(), 2);
}

#[test]
fn read_beyond_data_is_rejected() {
    let mut stream = ByteStream::from_vec(vec![1, 2]);
    assert_eq!(
        stream.read(3),
        Err(Error::ReadBeyondData {
            requested: 3,
            available: 2
        })
    );
}

#[test]
fn rewind_moves_cursor_back() {
    let mut stream = ByteStream::from_vec(vec![1, 2, 3]);
    stream.read(3).unwrap();
    stream.rewind(1).unwrap();
    assert_eq!(stream.tell(), 2);
    assert_eq!(stream.read(1).unwrap(), &[3]);
}

#[test]
fn consume_drops_front_bytes_and_rebases_cursor() {
    let mut stream = ByteStream::from_vec(vec![1, 2, 3, 4, 5]);
    stream.read(2).unwrap();
    stream.consume(2);
    assert_eq!(stream.size(), 3);
    assert_eq!(stream.tell(), 0);
    assert_eq!(stream.as_slice(), &[3, 4, 5]);
}

#[test]
fn read_to_end_greedily_consumes_remainder() {
    let mut stream = ByteStream::from_vec(vec![1, 2, 3, 4]);
    stream.read(1).unwrap();
    assert_eq!(stream.read_to_end(), &[2, 3, 4]);
    assert_eq!(stream.avail(), 0);
}

#[test]
fn append_grows_the_buffer_independent_of_cursor() {
    let mut stream = ByteStream::from_vec(vec![1, 2]);
    stream.read(2).unwrap();
    stream.append(&[3, 4]);
    assert_eq!(stream.avail(), 2);
    assert_eq!(stream.read(2).unwrap(), &[3, 4]);
}

use bytes::Bytes;
use lsrsim_frame::{decode_label_frame, decode_link_frame, decode_packet, FrameKind};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_decoded, DecodedFrame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = Bytes::from(args.wire.into_bytes());
    let decoded = if args.link {
        let link = decode_link_frame(&wire).map_err(|err| frame_error("decode failed", err))?;
        match link.kind {
            FrameKind::Network => {
                let packet = link.packet().map_err(|err| frame_error("decode failed", err))?;
                DecodedFrame::new(Some(link.kind), None, &packet)
            }
            FrameKind::Mpls => {
                let frame = link
                    .label_frame()
                    .map_err(|err| frame_error("decode failed", err))?;
                let packet = frame
                    .inner_packet()
                    .map_err(|err| frame_error("decode failed", err))?;
                DecodedFrame::new(Some(link.kind), Some(frame.label), &packet)
            }
        }
    } else if args.label {
        let frame = decode_label_frame(&wire).map_err(|err| frame_error("decode failed", err))?;
        let packet = frame
            .inner_packet()
            .map_err(|err| frame_error("decode failed", err))?;
        DecodedFrame::new(None, Some(frame.label), &packet)
    } else {
        let packet = decode_packet(&wire).map_err(|err| frame_error("decode failed", err))?;
        DecodedFrame::new(None, None, &packet)
    };

    print_decoded(&decoded, format);
    Ok(SUCCESS)
}
